use std::path::Path;

use anyhow::{Context, Result};
use contactbook_core::store::ContactStore;
use contactbook_core::transfer::{export_contacts, parse_import};
use owo_colors::OwoColorize;

use super::Account;

/// Write all contacts as JSON to `file`, or stdout when no file is given.
pub fn export(email: &str, file: Option<&Path>) -> Result<()> {
    let account = Account::open(email)?;
    let contacts = account.store.list_contacts(&account.user.id)?;
    let json = export_contacts(&contacts)?;

    match file {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Could not write {}", path.display()))?;
            eprintln!("Exported {} contacts to {}", contacts.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

pub fn import(email: &str, file: &Path) -> Result<()> {
    let account = Account::open(email)?;
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Could not read {}", file.display()))?;

    let inputs = parse_import(&json)?;
    let created = account.store.import_contacts(&account.user.id, inputs)?;

    println!(
        "{} {} contacts",
        "Imported".green(),
        created.len().to_string().bold()
    );
    Ok(())
}
