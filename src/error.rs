use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(jobboard::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(jobboard::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(jobboard::auth))]
    Auth(#[from] AuthError),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(jobboard::google_calendar))]
    GoogleCalendar(String),

    #[error("Storage error: {0}")]
    #[diagnostic(code(jobboard::storage))]
    Storage(String),

    #[error(transparent)]
    #[diagnostic(code(jobboard::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(jobboard::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(jobboard::other))]
    Other(String),
}

/// Ways the OAuth sign-in and sign-out flow can fail
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not signed in. Run `jobboard sign-in` first")]
    NotSignedIn,

    #[error("OAuth client is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("Authorization was denied: {0}")]
    Denied(String),

    #[error("Authorization callback state did not match the request")]
    StateMismatch,

    #[error("No authorization code found in callback")]
    MissingCode,

    #[error("Callback listener failed: {0}")]
    Callback(String),

    #[error("Token request failed: {0}")]
    TokenExchange(String),

    #[error("Sign-in cancelled")]
    Cancelled,
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Storage(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type JobResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create storage errors
pub fn storage_error(message: &str) -> Error {
    Error::Storage(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
