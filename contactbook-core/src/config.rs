//! Global contactbook configuration.
//!
//! Read from `~/.config/contactbook/config.toml`, then overridden by
//! `CONTACTBOOK__*` environment variables (e.g. `CONTACTBOOK__SESSION_SECRET`,
//! `CONTACTBOOK__REMINDERS__CHECK_INTERVAL`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{ContactBookError, ContactBookResult};
use crate::notification::DEFAULT_TITLE;
use crate::scheduler::ReminderSettings;
use crate::upcoming::UPCOMING_WINDOW_DAYS;

static DEFAULT_DATA_DIR: &str = "~/.local/share/contactbook";
static DEFAULT_BIND: &str = "127.0.0.1:4096";
static DEFAULT_CHECK_INTERVAL: &str = "24h";
static DEFAULT_MAIL_API_URL: &str = "https://api.resend.com/emails";
static DEFAULT_MAIL_FROM: &str = "contactbook <onboarding@resend.dev>";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Address the HTTP server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Secret used to sign session cookies. A random one is generated per run if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,

    #[serde(default)]
    pub secure_cookies: bool,

    /// Bearer secret expected by the cron endpoints. Cron is disabled if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_secret: Option<String>,

    #[serde(default)]
    pub reminders: ReminderConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: default_data_dir(),
            bind: default_bind(),
            session_secret: None,
            secure_cookies: false,
            cron_secret: None,
            reminders: ReminderConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// How often reminders are checked, e.g. "24h", "30m".
    pub check_interval: String,
    pub window_days: u32,
    pub title: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            check_interval: DEFAULT_CHECK_INTERVAL.to_string(),
            window_days: UPCOMING_WINDOW_DAYS,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl ReminderConfig {
    pub fn settings(&self) -> ContactBookResult<ReminderSettings> {
        let check_interval = humantime::parse_duration(&self.check_interval).map_err(|e| {
            ContactBookError::Config(format!(
                "invalid reminders.check_interval '{}': {e}",
                self.check_interval
            ))
        })?;

        Ok(ReminderSettings {
            check_interval,
            window_days: self.window_days,
            title: self.title.clone(),
        })
    }
}

/// Resend-compatible e-mail API used for cron digests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        MailConfig {
            api_url: DEFAULT_MAIL_API_URL.to_string(),
            api_key: None,
            from: DEFAULT_MAIL_FROM.to_string(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> ContactBookResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ContactBookError::Config("Could not determine config directory".into()))?
            .join("contactbook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, creating a commented default file on first run.
    pub fn load() -> ContactBookResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> ContactBookResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("CONTACTBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ContactBookError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ContactBookError::Config(e.to_string()))
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn save(&self, path: &Path) -> ContactBookResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ContactBookError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| ContactBookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ContactBookResult<()> {
        let contents = format!(
            "\
# contactbook configuration

# Where users and contacts are stored:
# data_dir = \"{}\"

# HTTP server address:
# bind = \"{}\"

# Secret for signing session cookies (random per run if unset):
# session_secret = \"change-me\"
# secure_cookies = false

# Bearer secret for /api/cron endpoints:
# cron_secret = \"change-me\"

# [reminders]
# check_interval = \"{}\"
# window_days = {}
# title = \"{}\"

# [mail]
# api_url = \"{}\"
# api_key = \"re_...\"
# from = \"{}\"
",
            DEFAULT_DATA_DIR,
            DEFAULT_BIND,
            DEFAULT_CHECK_INTERVAL,
            UPCOMING_WINDOW_DAYS,
            DEFAULT_TITLE,
            DEFAULT_MAIL_API_URL,
            DEFAULT_MAIL_FROM,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ContactBookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ContactBookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
