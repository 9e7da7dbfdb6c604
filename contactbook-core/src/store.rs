//! Persistence for users and contacts.
//!
//! [`FileStore`] keeps everything as JSON under one data directory:
//!
//! ```text
//! <data_dir>/users.json
//! <data_dir>/contacts/<user-id>.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::contact::{Contact, ContactInput};
use crate::error::{ContactBookError, ContactBookResult};
use crate::user::{User, normalize_email};

pub trait ContactStore {
    /// All contacts of a user, most recently updated first.
    fn list_contacts(&self, user_id: &str) -> ContactBookResult<Vec<Contact>>;

    fn get_contact(&self, user_id: &str, id: &str) -> ContactBookResult<Contact>;

    fn create_contact(&self, user_id: &str, input: ContactInput) -> ContactBookResult<Contact>;

    fn update_contact(
        &self,
        user_id: &str,
        id: &str,
        input: ContactInput,
    ) -> ContactBookResult<Contact>;

    fn delete_contact(&self, user_id: &str, id: &str) -> ContactBookResult<()>;

    /// Returns the number of contacts removed.
    fn delete_all_contacts(&self, user_id: &str) -> ContactBookResult<usize>;

    /// Create many contacts at once. Nothing is written if any input is invalid.
    fn import_contacts(
        &self,
        user_id: &str,
        inputs: Vec<ContactInput>,
    ) -> ContactBookResult<Vec<Contact>>;
}

pub trait UserStore {
    fn create_user(&self, email: &str, password_hash: String) -> ContactBookResult<User>;

    fn find_user_by_email(&self, email: &str) -> ContactBookResult<Option<User>>;

    fn get_user(&self, id: &str) -> ContactBookResult<User>;

    fn list_users(&self) -> ContactBookResult<Vec<User>>;
}

/// JSON-file store. Writes are serialized through an internal lock.
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> ContactBookResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join("contacts"))?;
        Ok(FileStore {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn users_path(&self) -> PathBuf {
        self.root.join("users.json")
    }

    fn contacts_path(&self, user_id: &str) -> ContactBookResult<PathBuf> {
        let safe = !user_id.is_empty()
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(ContactBookError::UserNotFound(user_id.to_string()));
        }
        Ok(self.root.join("contacts").join(format!("{}.json", user_id)))
    }

    fn load_contacts(&self, user_id: &str) -> ContactBookResult<Vec<Contact>> {
        read_json(&self.contacts_path(user_id)?)
    }

    fn save_contacts(&self, user_id: &str, contacts: &[Contact]) -> ContactBookResult<()> {
        write_json(&self.contacts_path(user_id)?, &contacts)
    }

    /// Run a read-modify-write on one user's contacts under the write lock.
    fn modify_contacts<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut Vec<Contact>) -> ContactBookResult<T>,
    ) -> ContactBookResult<T> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut contacts = self.load_contacts(user_id)?;
        let result = f(&mut contacts)?;
        self.save_contacts(user_id, &contacts)?;
        Ok(result)
    }
}

impl ContactStore for FileStore {
    fn list_contacts(&self, user_id: &str) -> ContactBookResult<Vec<Contact>> {
        let mut contacts = self.load_contacts(user_id)?;
        contacts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(contacts)
    }

    fn get_contact(&self, user_id: &str, id: &str) -> ContactBookResult<Contact> {
        self.load_contacts(user_id)?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ContactBookError::ContactNotFound(id.to_string()))
    }

    fn create_contact(&self, user_id: &str, input: ContactInput) -> ContactBookResult<Contact> {
        input.validate()?;
        let contact = Contact::from_input(user_id, input, Utc::now());

        self.modify_contacts(user_id, |contacts| {
            contacts.push(contact.clone());
            Ok(())
        })?;

        tracing::debug!(user = user_id, contact = %contact.id, "contact created");
        Ok(contact)
    }

    fn update_contact(
        &self,
        user_id: &str,
        id: &str,
        input: ContactInput,
    ) -> ContactBookResult<Contact> {
        input.validate()?;

        self.modify_contacts(user_id, |contacts| {
            let contact = contacts
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| ContactBookError::ContactNotFound(id.to_string()))?;
            contact.apply(input, Utc::now());
            Ok(contact.clone())
        })
    }

    fn delete_contact(&self, user_id: &str, id: &str) -> ContactBookResult<()> {
        self.modify_contacts(user_id, |contacts| {
            let before = contacts.len();
            contacts.retain(|c| c.id != id);
            if contacts.len() == before {
                return Err(ContactBookError::ContactNotFound(id.to_string()));
            }
            Ok(())
        })
    }

    fn delete_all_contacts(&self, user_id: &str) -> ContactBookResult<usize> {
        self.modify_contacts(user_id, |contacts| {
            let removed = contacts.len();
            contacts.clear();
            Ok(removed)
        })
    }

    fn import_contacts(
        &self,
        user_id: &str,
        inputs: Vec<ContactInput>,
    ) -> ContactBookResult<Vec<Contact>> {
        for (i, input) in inputs.iter().enumerate() {
            input.validate().map_err(|e| {
                ContactBookError::InvalidContact(format!("entry {}: {}", i + 1, e))
            })?;
        }

        let now = Utc::now();
        let created: Vec<Contact> = inputs
            .into_iter()
            .map(|input| Contact::from_input(user_id, input, now))
            .collect();

        self.modify_contacts(user_id, |contacts| {
            contacts.extend(created.iter().cloned());
            Ok(())
        })?;

        tracing::info!(user = user_id, count = created.len(), "contacts imported");
        Ok(created)
    }
}

impl UserStore for FileStore {
    fn create_user(&self, email: &str, password_hash: String) -> ContactBookResult<User> {
        let email = normalize_email(email);
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut users: Vec<User> = read_json(&self.users_path())?;
        if users.iter().any(|u| u.email == email) {
            return Err(ContactBookError::UserExists(email));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        write_json(&self.users_path(), &users)?;

        tracing::info!(user = %user.id, "user registered");
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> ContactBookResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self.list_users()?.into_iter().find(|u| u.email == email))
    }

    fn get_user(&self, id: &str) -> ContactBookResult<User> {
        self.list_users()?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| ContactBookError::UserNotFound(id.to_string()))
    }

    fn list_users(&self) -> ContactBookResult<Vec<User>> {
        read_json(&self.users_path())
    }
}

/// Read a JSON list, treating a missing file as empty.
fn read_json<T: DeserializeOwned>(path: &Path) -> ContactBookResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write through a temporary file so readers never see a half-written list.
fn write_json<T: Serialize>(path: &Path, value: &T) -> ContactBookResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
