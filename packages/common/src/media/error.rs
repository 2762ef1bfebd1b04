use thiserror::Error;

/// Errors returned by a [`MediaHost`](super::MediaHost).
#[derive(Debug, Error)]
pub enum MediaError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("media host unreachable: {0}")]
    Transport(String),
    /// The host answered with a non-success status.
    #[error("media host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The host answered 2xx but the body did not have the expected shape.
    #[error("unexpected media host response: {0}")]
    InvalidResponse(String),
    /// The payload exceeds the configured size limit.
    #[error("image exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge { actual: usize, limit: usize },
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            MediaError::Rejected {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            MediaError::InvalidResponse(err.to_string())
        } else {
            MediaError::Transport(err.to_string())
        }
    }
}
