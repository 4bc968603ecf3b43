use std::io;
use thiserror::Error;

/// Unified error type for the assistant
#[derive(Error, Debug)]
pub enum AssistError {
    /// Completion API errors (Groq, DeepSeek, etc.)
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors, including missing API keys
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// Bookmarks already hold the maximum number of items
    #[error("Bookmark limit of {0} reached")]
    PinLimitReached(usize),

    /// A chat turn is already awaiting a response
    #[error("A chat turn is already in progress")]
    TurnInProgress,

    /// No history or bookmark entry with the given id
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Window-level operation failed
    #[error("Window error: {0}")]
    Window(String),

    /// Unknown or unexpected errors
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for AssistError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AssistError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            AssistError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            AssistError::Api(format!("API returned error status: {}", err))
        } else {
            AssistError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for AssistError {
    fn from(err: serde_json::Error) -> Self {
        AssistError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for AssistError {
    fn from(err: serde_yml::Error) -> Self {
        AssistError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<String> for AssistError {
    fn from(err: String) -> Self {
        AssistError::Unknown(err)
    }
}

impl From<&str> for AssistError {
    fn from(err: &str) -> Self {
        AssistError::Unknown(err.to_string())
    }
}
