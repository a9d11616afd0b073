//! Error types
//!
//! A single error enum shared by the Azure client, the plugin host and the
//! tables. Provider failures keep their ARM error code so tables can decide
//! which codes mean "not found".

use thiserror::Error;

/// A specialized Result type for table operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the Azure client and the table plugin.
#[derive(Debug, Error)]
pub enum Error {
    /// ARM answered with a non-success status.
    #[error("{code}: {message} (HTTP {status})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// No usable credential, or the token endpoint refused us.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure talking to Azure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("Failed to parse response JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A Get was issued without one of the table's key columns.
    #[error("Missing required key column: {0}")]
    MissingKeyColumn(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new authentication error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The ARM error code carried by this error, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    /// HTTP status of a provider error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
