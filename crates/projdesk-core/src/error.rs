//! Error types for Projdesk

use thiserror::Error;

use crate::form::ValidationErrors;

/// Result type alias using Projdesk's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Projdesk error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Record errors (E001-E099)
    #[error("Record {id} not found in '{resource}'. Run `projdesk projects list` to see all projects.")]
    RecordNotFound { resource: String, id: i64 },

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    // Network errors (E100-E199)
    #[error("Network error: {0}. Check that the API is reachable.")]
    NetworkError(#[from] reqwest::Error),

    #[error("Unauthorized: {0}. Set the PROJDESK_API_TOKEN environment variable.")]
    Unauthorized(String),

    #[error("Request rejected by server: {0}")]
    Rejected(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // View state errors (E700-E799)
    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Record is not loaded yet")]
    NotReady,

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    // Serialization errors (E900-E999)
    #[error("Malformed record: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::RecordNotFound { .. } => "E001",
            Self::UnknownField(_) => "E002",
            Self::NetworkError(_) => "E100",
            Self::Unauthorized(_) => "E101",
            Self::Rejected(_) => "E102",
            Self::Api { .. } => "E103",
            Self::ConfigError(_) => "E600",
            Self::SaveInProgress => "E700",
            Self::NotReady => "E701",
            Self::InvalidInput(_) => "E800",
            Self::Validation(_) => "E801",
            Self::Json(_) => "E900",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::RecordNotFound { .. } => Some("projdesk projects list".to_string()),
            Self::NetworkError(_) => Some("projdesk config get api.base_url".to_string()),
            Self::Unauthorized(_) => Some("export PROJDESK_API_TOKEN=<token>".to_string()),
            Self::ConfigError(_) => Some("projdesk config list".to_string()),
            Self::SaveInProgress => Some("Wait for the pending save to finish".to_string()),
            _ => None,
        }
    }
}
