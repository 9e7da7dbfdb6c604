//! Core types for the contactbook ecosystem.
//!
//! This crate is shared by the server, the desktop notifier and the CLI:
//! - contacts, their dated events and how those resolve into concrete days
//! - the upcoming-events window and the yearly calendar view
//! - the reminder scheduler and its `Notifier` seam
//! - file-backed storage, accounts and session tokens

pub mod auth;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod contact;
pub mod error;
pub mod event_date;
pub mod notification;
pub mod resolve;
pub mod scheduler;
pub mod store;
pub mod transfer;
pub mod upcoming;
pub mod user;
pub mod years;

pub use contact::{Contact, ContactDetails, ContactEvent, ContactEvents, ContactInput, ContactName};
pub use error::{ContactBookError, ContactBookResult};
pub use event_date::EventDate;
pub use resolve::{ResolvedEvent, resolve_events};
pub use upcoming::{UPCOMING_WINDOW_DAYS, filter_upcoming};
