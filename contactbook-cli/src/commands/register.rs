use anyhow::Result;
use contactbook_core::auth::hash_password;
use contactbook_core::store::UserStore;
use owo_colors::OwoColorize;

use super::open_store;

pub fn run(email: &str) -> Result<()> {
    if !email.contains('@') {
        anyhow::bail!("'{}' is not an e-mail address", email);
    }

    let (_, store) = open_store()?;

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    let confirm = rpassword::prompt_password("Repeat password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let user = store.create_user(email, hash_password(&password)?)?;

    println!("{} {}", "Registered".green(), user.email.bold());
    println!("{}", format!("Data directory: {}", store.root().display()).dimmed());

    Ok(())
}
