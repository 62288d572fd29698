use reqwest::StatusCode;
use thiserror::Error;

/// Why a fetch operation failed.
///
/// Every failed operation surfaces exactly one of these; callers pattern-match
/// instead of catching a generic error type.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, or a timed-out attempt.
    #[error("failed to reach weather API: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("weather API request failed with status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    /// A 2xx response whose body could not be decoded or is missing required fields.
    #[error("malformed weather response: {0}")]
    MalformedResponse(String),

    /// Caller-supplied input violated a precondition; no request was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl FetchError {
    /// Whether the retry loop may re-attempt after this error.
    ///
    /// Transport and HTTP-status failures are transient; a malformed body or a
    /// bad argument will not improve on a second try.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Transport(_) | FetchError::HttpStatus { .. }
        )
    }
}
