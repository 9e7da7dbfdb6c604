//! JSON export and import of a user's whole contact set.

use crate::contact::{Contact, ContactInput};
use crate::error::{ContactBookError, ContactBookResult};

/// Pretty-printed JSON array of contacts.
pub fn export_contacts(contacts: &[Contact]) -> ContactBookResult<String> {
    Ok(serde_json::to_string_pretty(contacts)?)
}

/// Parse an exported file back into contact inputs.
///
/// Ids, owners and timestamps in the file are ignored; imported contacts get new ones.
pub fn parse_import(json: &str) -> ContactBookResult<Vec<ContactInput>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    inputs_from_value(value)
}

pub fn inputs_from_value(value: serde_json::Value) -> ContactBookResult<Vec<ContactInput>> {
    let serde_json::Value::Array(items) = value else {
        return Err(ContactBookError::InvalidContact(
            "contacts must be an array".into(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).map_err(|e| {
                ContactBookError::InvalidContact(format!("entry {}: {}", i + 1, e))
            })
        })
        .collect()
}
