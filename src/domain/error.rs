//! Error types for form sessions and their collaborators

use thiserror::Error;

use super::record::Navigation;

/// Errors that can occur while resolving, searching or submitting a form
#[derive(Debug, Error)]
pub enum FormError {
    /// Network or HTTP-level failure talking to the data service
    #[error("Transport error: {0}")]
    Transport(String),

    /// The data service answered with an error payload
    #[error("Remote error in {operation}: {message}")]
    Remote { operation: String, message: String },

    /// The response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The record version being edited does not exist or could not be fetched
    #[error("Record {record_id} version {version} is unavailable")]
    RecordUnavailable { record_id: String, version: u32 },

    /// Create/update call rejected or returned a falsy result
    #[error("Submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    /// Another submission is still in flight
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// Static form values do not match the page context
    #[error("Form shape does not match the page context: {0}")]
    ShapeMismatch(String),

    /// Field tree nests deeper than the configured bound
    #[error("Schema nests deeper than {max_depth} levels")]
    SchemaTooDeep { max_depth: usize },

    /// The session was torn down
    #[error("Session is closed")]
    SessionClosed,

    /// Fixture files could not be loaded
    #[error("Fixture error: {0}")]
    Fixture(String),
}

impl FormError {
    /// Navigation a host must perform when this error surfaces, if any.
    ///
    /// Only an unavailable record leaves the session; every other failure
    /// degrades in place.
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            Self::RecordUnavailable { .. } => Some(Navigation::ApplicationList),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FormError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FormError::Transport("request timed out".to_string())
        } else if err.is_decode() {
            FormError::Decode(err.to_string())
        } else {
            FormError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        FormError::Decode(err.to_string())
    }
}

/// Result type alias for form operations
pub type FormResult<T> = Result<T, FormError>;
