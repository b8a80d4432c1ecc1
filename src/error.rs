use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationMissing,
    UpstreamUnreachable,
    MalformedResponse,
    Io,
}

/// Failure surfaced by the query layer.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("configuration missing: {0}")]
    Config(String),

    #[error("upstream unreachable{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("io error: {0}")]
    Io(String),
}

pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::ConfigurationMissing,
            Self::Upstream { .. } => ErrorKind::UpstreamUnreachable,
            Self::Malformed(_) => ErrorKind::MalformedResponse,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Serializable view for the presentation layer.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            status: self.status(),
            message: self.to_string(),
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}
