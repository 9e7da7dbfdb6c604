//! Russian pluralization of year counts ("1 год", "2 года", "5 лет").

/// Format `n` followed by the grammatically correct Russian word for "years".
pub fn format_year_count(n: u32) -> String {
    let word = if (11..=14).contains(&(n % 100)) {
        "лет"
    } else {
        match n % 10 {
            1 => "год",
            2..=4 => "года",
            _ => "лет",
        }
    };

    format!("{} {}", n, word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_few_and_many_forms() {
        assert_eq!(format_year_count(1), "1 год");
        assert_eq!(format_year_count(2), "2 года");
        assert_eq!(format_year_count(4), "4 года");
        assert_eq!(format_year_count(5), "5 лет");
        assert_eq!(format_year_count(21), "21 год");
        assert_eq!(format_year_count(34), "34 года");
    }

    #[test]
    fn test_teens_always_use_many_form() {
        for n in [11, 12, 13, 14, 111, 112, 214] {
            assert!(format_year_count(n).ends_with("лет"), "{n}");
        }
        assert_eq!(format_year_count(112), "112 лет");
    }

    #[test]
    fn test_zero() {
        assert_eq!(format_year_count(0), "0 лет");
    }
}
