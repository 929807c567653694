//! External API integrations

pub mod airtable;
pub mod record_store;

pub use airtable::AirtableClient;
pub use record_store::{Fields, ListQuery, Record, RecordStore};
