use leonai_schema::GenerationState;
use reqwest::StatusCode;
use thiserror::Error as ThisError;

use crate::utils::logging::preview;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, ThisError)]
pub enum LeonardoError {
    /// Network-level failure (DNS, connect, TLS, timeouts).
    #[error("HTTP transport error (timeout: {timeout}): {source}")]
    Transport {
        timeout: bool,
        #[source]
        source: BoxError,
    },

    /// Non-2xx response. Body is kept as a short preview.
    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    /// 2xx response carrying a GraphQL `errors` list.
    #[error("Upstream API error [{code}]: {message}")]
    Api { code: String, message: String },

    #[error("Couldn't decode {target} response: {source}")]
    Decode {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("User id mismatch: token claims {token_user_id}, lookup returned {lookup_user_id}")]
    IdentityMismatch {
        token_user_id: String,
        lookup_user_id: String,
    },

    #[error("Unsupported file extension: {0:?}")]
    UnsupportedFormat(String),

    #[error("Generation submission failed: {0}")]
    Submission(String),

    #[error("No generations found")]
    NoGenerations,

    #[error("Generation {0} not found in feed")]
    GenerationNotFound(String),

    #[error("Generation finished with status {status}")]
    GenerationFailed { status: GenerationState },

    #[error("Missing field in upstream response: {0}")]
    MissingField(&'static str),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for LeonardoError {
    fn from(err: reqwest::Error) -> Self {
        LeonardoError::Transport {
            timeout: err.is_timeout(),
            source: Box::new(err),
        }
    }
}

impl LeonardoError {
    pub fn upstream_status(status: StatusCode, body: &[u8]) -> Self {
        LeonardoError::UpstreamStatus {
            status,
            body: preview(body),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LeonardoError::Cancelled)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            LeonardoError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
