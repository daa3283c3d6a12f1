use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Workjam API error: {0}")]
    #[diagnostic(code(shiftsync::workjam))]
    Workjam(String),

    #[error("Workjam API returned HTTP {status} for {url}: {body}")]
    #[diagnostic(code(shiftsync::workjam_status))]
    WorkjamStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(shiftsync::google_calendar))]
    GoogleCalendar(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(shiftsync::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(shiftsync::config))]
    Config(String),

    #[error("Transform error: {0}")]
    #[diagnostic(code(shiftsync::transform))]
    Transform(String),

    #[error("Sync finished with {} failed event(s): {}", .failed_uids.len(), .failed_uids.join(", "))]
    #[diagnostic(
        code(shiftsync::sync),
        help("the remaining events were synced, re-run to retry the failed ones")
    )]
    Sync { failed_uids: Vec<String> },

    #[error("HTTP error: {0}")]
    #[diagnostic(code(shiftsync::http))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(shiftsync::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(shiftsync::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(shiftsync::other))]
    Other(String),
}

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
pub type ShiftResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Workjam errors
pub fn workjam_error(message: &str) -> Error {
    Error::Workjam(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create transform errors
pub fn transform_error(message: &str) -> Error {
    Error::Transform(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
