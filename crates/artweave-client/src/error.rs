// Classified failures of the request client.

use std::time::Duration;

use artweave_core::config::BASE_URL_ENV;
use artweave_core::session::CacheError;
use thiserror::Error;

/// Shown when the server answers with a non-success status and an empty body.
pub const HTTP_FALLBACK_MESSAGE: &str = "We ran into an issue while contacting ArtWeave Lite.";

/// Shown when an error carries no message of its own.
pub const UNEXPECTED_MESSAGE: &str = "Unexpected error. Please try again.";

/// Status reported for timed-out requests.
pub const TIMEOUT_STATUS: u16 = 408;

/// Status reported when no request could be built for lack of configuration.
pub const MISSING_CONFIG_STATUS: u16 = 0;

/// Coarse classification for callers that branch on failure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No base URL configured. Raised before any network activity.
    Config,
    Timeout,
    Http,
    Parse,
    Transport,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing API base URL. Set {}.", BASE_URL_ENV)]
    MissingBaseUrl,

    /// The request did not finish within the allotted duration and was
    /// cancelled.
    #[error("That request took too long. Please try again.")]
    Timeout(Duration),

    /// Non-success HTTP status. `message` is the response body, or
    /// [`HTTP_FALLBACK_MESSAGE`] when the body was empty.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("failed to parse response body: {0}")]
    Parse(#[from] serde_json::Error),

    /// Connection-level failure (refused, DNS, reset, invalid URL).
    #[error("{}", message_or_fallback(.message))]
    Transport { message: String },
}

fn message_or_fallback(message: &str) -> &str {
    if message.trim().is_empty() {
        UNEXPECTED_MESSAGE
    } else {
        message
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::MissingBaseUrl => ErrorKind::Config,
            ApiError::Timeout(_) => ErrorKind::Timeout,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Parse(_) => ErrorKind::Parse,
            ApiError::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// HTTP status associated with the failure: the server's status for
    /// [`ApiError::Http`], 408 for timeouts, 0 for a missing base URL,
    /// `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::MissingBaseUrl => Some(MISSING_CONFIG_STATUS),
            ApiError::Timeout(_) => Some(TIMEOUT_STATUS),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing next to a retry affordance.
    pub fn user_message(&self) -> String {
        let text = self.to_string();
        message_or_fallback(&text).to_string()
    }

    pub(crate) fn http(status: u16, body: String) -> Self {
        let message = if body.is_empty() {
            HTTP_FALLBACK_MESSAGE.to_string()
        } else {
            body
        };
        ApiError::Http { status, message }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Serialize { source, .. } => ApiError::Parse(source),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport {
            message: err.to_string(),
        }
    }
}
