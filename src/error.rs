use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(calendar_agent::config))]
    Config(String),

    /// Failures reported by the calendar store, displayed verbatim
    #[error("{0}")]
    #[diagnostic(code(calendar_agent::calendar_store))]
    CalendarStore(String),

    #[error("Language model error: {0}")]
    #[diagnostic(code(calendar_agent::nlp))]
    Nlp(String),

    #[error("Malformed intent payload: {0}")]
    #[diagnostic(code(calendar_agent::intent_payload))]
    IntentPayload(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(calendar_agent::http))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(calendar_agent::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calendar_agent::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calendar_agent::other))]
    Other(String),
}

// Implement From for JSON errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AgentResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create calendar store errors
pub fn calendar_store_error(message: &str) -> Error {
    Error::CalendarStore(message.to_string())
}

/// Helper to create language model errors
pub fn nlp_error(message: &str) -> Error {
    Error::Nlp(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
