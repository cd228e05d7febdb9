// Error types shared by the library modules. The binary converts these into
// `anyhow::Error` at the top level.

use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = HoplaError> = std::result::Result<T, E>;

/// Errors that abort a whole command.
#[derive(Debug, Error)]
pub enum HoplaError {
    #[error("invalid checklist job: {0}")]
    InvalidJob(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Outcome of a single failed API call.
///
/// During a checklist batch these never escape: they are recorded in the
/// item's `Failed` result and the batch moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    #[error("malformed response: {0}")]
    MalformedBody(String),
}
