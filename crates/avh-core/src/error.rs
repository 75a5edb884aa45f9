//! Core error types for the hub console.

use avh_client_api::ClientApiError;

/// Core error type for console operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Client(#[from] ClientApiError),

    #[error("REST client error: {0}")]
    Rest(#[from] avh_rest_client::RestClientError),

    #[error("Database error: {0}")]
    Database(#[from] avh_local_db::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error.
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }
}
