//! Error taxonomy for statusboard.
//!
//! None of these errors reach the rendered report. Source errors are
//! absorbed by the resolvers that consume them and probe errors collapse
//! into a `down` result.

/// Failure to load an optional document (local config, registry, repository API).
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("transport error fetching {location}: {message}")]
    Transport { location: String, message: String },

    #[error("{location} answered HTTP {status}")]
    HttpStatus { location: String, status: u16 },

    #[error("malformed document at {location}: {reason}")]
    Malformed { location: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        SourceError::Malformed {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Whether this failure came from a non-success HTTP answer.
    pub fn is_http_status(&self) -> bool {
        matches!(self, SourceError::HttpStatus { .. })
    }
}

/// Outcome of an optional source: loaded, or failed and contributing nothing.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Failure of a single reachability check.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid probe url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0} ms")]
    TimedOut(u64),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::Transport(err.to_string())
    }
}
