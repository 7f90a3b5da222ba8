use std::fmt;

#[derive(Debug)]
pub enum SyncError {
    /// A required event field was absent or blank.
    MissingField(&'static str),
    /// Sender and receiver name the same agent.
    SelfInteraction(String),
    InvalidTimestamp(String),
    InvalidConfig(String),
    Json(serde_json::Error),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::MissingField(field) => write!(f, "missing required field: {field}"),
            SyncError::SelfInteraction(agent) => {
                write!(f, "sender and receiver are the same: {agent}")
            }
            SyncError::InvalidTimestamp(ts) => write!(f, "invalid timestamp: {ts}"),
            SyncError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            SyncError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
