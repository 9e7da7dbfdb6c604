use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use contactbook_core::auth::{TokenSigner, generate_secret};
use contactbook_core::clock::{Clock, SystemClock};
use contactbook_core::config::AppConfig;
use contactbook_core::store::FileStore;

use crate::push::Subscriptions;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    pub signer: TokenSigner,
    pub config: Arc<AppConfig>,
    pub subscriptions: Subscriptions,
    pub http: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = FileStore::open(config.data_path())?;

        let secret = match &config.session_secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!("session_secret is not set; sessions will not survive a restart");
                generate_secret()
            }
        };

        Ok(AppState {
            store: Arc::new(store),
            signer: TokenSigner::new(secret),
            config: Arc::new(config),
            subscriptions: Subscriptions::default(),
            http: reqwest::Client::new(),
            clock: Arc::new(SystemClock),
        })
    }

    /// Swap the clock, for tests that need a fixed "today".
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}
