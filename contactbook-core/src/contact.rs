//! Contact records and their named recurring events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ContactBookError, ContactBookResult};
use crate::event_date::EventDate;

/// A stored contact, owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub user_id: String,
    pub name: ContactName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub contacts: ContactDetails,
    #[serde(default)]
    pub events: ContactEvents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactName {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    /// Title or honorific, e.g. "Dr."
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dignity: Option<String>,
}

/// Phone numbers and e-mail addresses, in the order the user entered them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// One named recurring event, with its date kept in the stored `DD.MM[.YYYY]` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEvent {
    pub label: String,
    pub date: String,
}

impl ContactEvent {
    pub fn parsed_date(&self) -> ContactBookResult<EventDate> {
        EventDate::parse(&self.date)
    }
}

/// Ordered `(label, date)` pairs with unique labels.
///
/// Serialized as a JSON object `{ "label": "DD.MM" }` in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactEvents(Vec<ContactEvent>);

impl ContactEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Fails if the label is already present.
    pub fn insert(
        &mut self,
        label: impl Into<String>,
        date: impl Into<String>,
    ) -> ContactBookResult<()> {
        let label = label.into();
        if self.get(&label).is_some() {
            return Err(ContactBookError::DuplicateEventLabel(label));
        }
        self.0.push(ContactEvent {
            label,
            date: date.into(),
        });
        Ok(())
    }

    pub fn from_pairs<I, L, D>(pairs: I) -> ContactBookResult<Self>
    where
        I: IntoIterator<Item = (L, D)>,
        L: Into<String>,
        D: Into<String>,
    {
        let mut events = Self::new();
        for (label, date) in pairs {
            events.insert(label, date)?;
        }
        Ok(events)
    }

    pub fn get(&self, label: &str) -> Option<&ContactEvent> {
        self.0.iter().find(|e| e.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactEvent> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ContactEvents {
    type Item = &'a ContactEvent;
    type IntoIter = std::slice::Iter<'a, ContactEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for ContactEvents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for event in &self.0 {
            map.serialize_entry(&event.label, &event.date)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ContactEvents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EventsVisitor;

        impl<'de> Visitor<'de> for EventsVisitor {
            type Value = ContactEvents;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of event labels to DD.MM[.YYYY] dates")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut events = ContactEvents::new();
                while let Some((label, date)) = access.next_entry::<String, String>()? {
                    events.insert(label, date).map_err(de::Error::custom)?;
                }
                Ok(events)
            }

            // Older records store `null` when a contact has no events
            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ContactEvents::new())
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ContactEvents::new())
            }
        }

        deserializer.deserialize_any(EventsVisitor)
    }
}

impl ContactName {
    /// Name as shown next to an event: "Dr. John (Smith)" with a title,
    /// otherwise "Smith John Paul".
    pub fn display_name(&self) -> String {
        match non_empty(&self.dignity) {
            Some(dignity) => format!("{} {} ({})", dignity, self.first_name, self.last_name),
            None => {
                let mut parts = vec![self.last_name.as_str(), self.first_name.as_str()];
                if let Some(middle) = non_empty(&self.middle_name) {
                    parts.push(middle);
                }
                parts.retain(|p| !p.is_empty());
                parts.join(" ")
            }
        }
    }

    /// "First Last", used by the year calendar.
    pub fn short_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Fields a user may set when creating or updating a contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub name: ContactName,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub contacts: ContactDetails,
    #[serde(default)]
    pub events: ContactEvents,
}

impl ContactInput {
    /// Check the invariants every written contact must satisfy.
    pub fn validate(&self) -> ContactBookResult<()> {
        if self.name.first_name.trim().is_empty() && self.name.last_name.trim().is_empty() {
            return Err(ContactBookError::InvalidContact(
                "first or last name is required".into(),
            ));
        }

        for event in &self.events {
            if event.label.trim().is_empty() {
                return Err(ContactBookError::InvalidContact(
                    "event label must not be empty".into(),
                ));
            }
            event.parsed_date()?;
        }

        Ok(())
    }
}

impl Contact {
    pub fn from_input(user_id: &str, input: ContactInput, now: DateTime<Utc>) -> Self {
        Contact {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: input.name,
            address: clean(input.address),
            group: clean(input.group),
            contacts: input.contacts,
            events: input.events,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: ContactInput, now: DateTime<Utc>) {
        self.name = input.name;
        self.address = clean(input.address);
        self.group = clean(input.group);
        self.contacts = input.contacts;
        self.events = input.events;
        self.updated_at = now;
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
