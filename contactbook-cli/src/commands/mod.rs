pub mod calendar;
pub mod register;
pub mod transfer;
pub mod upcoming;

use anyhow::{Context, Result};
use contactbook_core::config::AppConfig;
use contactbook_core::store::{FileStore, UserStore};
use contactbook_core::user::User;

/// Open the configured data directory.
pub fn open_store() -> Result<(AppConfig, FileStore)> {
    let config = AppConfig::load()?;
    let store = FileStore::open(config.data_path())
        .with_context(|| format!("Could not open {}", config.data_path().display()))?;
    Ok((config, store))
}

/// The store plus the account a command acts on.
pub struct Account {
    pub config: AppConfig,
    pub store: FileStore,
    pub user: User,
}

impl Account {
    pub fn open(email: &str) -> Result<Self> {
        let (config, store) = open_store()?;
        let user = store.find_user_by_email(email)?.with_context(|| {
            format!(
                "No account registered for {}.\n\n\
                Create one with:\n  \
                contactbook register {}",
                email, email
            )
        })?;

        Ok(Account {
            config,
            store,
            user,
        })
    }
}
