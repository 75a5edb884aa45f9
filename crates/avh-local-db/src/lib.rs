//! Local key-value persistence for Agent Validation Hub state.
//!
//! The local mock keeps every collection as a JSON document stored under a
//! named slot. Slots live in a SQLite `kv` table; [`MemoryStore`] offers the
//! same interface without touching disk.

pub mod connection;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod store;

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for database operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {message}")]
    Migration { message: String },

    #[error("Serialization error in slot '{key}': {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic database error: {0}")]
    Generic(String),
}

impl Error {
    /// Create a new migration error.
    pub fn migration<S: Into<String>>(message: S) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    /// Create a new serialization error for a slot.
    pub fn serde<S: Into<String>>(key: S, source: serde_json::Error) -> Self {
        Self::Serde {
            key: key.into(),
            source,
        }
    }

    /// Create a new generic database error.
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }
}

/// Database connection and management.
pub use connection::Database;

/// Database models and operations.
pub use models::KvStore;

/// Injectable slot stores.
pub use store::{KeyValueStore, KeyValueStoreExt, MemoryStore, SqliteStore};

/// Schema definitions and constants.
pub use schema::*;
