//! Error types for the contactbook ecosystem.

use thiserror::Error;

/// Errors that can occur in contactbook operations.
#[derive(Error, Debug)]
pub enum ContactBookError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid event date '{0}'. Expected DD.MM or DD.MM.YYYY")]
    InvalidEventDate(String),

    #[error("Duplicate event label '{0}'")]
    DuplicateEventLabel(String),

    #[error("Invalid contact: {0}")]
    InvalidContact(String),

    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired session token")]
    InvalidToken,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ContactBookError {
    fn from(err: serde_json::Error) -> Self {
        ContactBookError::Serialization(err.to_string())
    }
}

/// Result type alias for contactbook operations.
pub type ContactBookResult<T> = Result<T, ContactBookError>;
