//! Local persistence for studyhall
//!
//! Provides:
//! - `LocalStore` key-value trait with in-memory and SQLite backends
//! - The base64-over-JSON codec for opaque stored values
//! - `LedgerStore`, the typed façade the stopwatch engine persists through

mod codec;
mod kv;
mod ledger;
mod sqlite;

pub use codec::*;
pub use kv::*;
pub use ledger::*;
pub use sqlite::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage full or unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
