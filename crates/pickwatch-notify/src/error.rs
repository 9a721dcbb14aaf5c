use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{channel} returned HTTP {status}")]
    UnexpectedStatus { channel: &'static str, status: u16 },

    #[error("{channel} rejected the message (code {code}): {message}")]
    Rejected {
        channel: &'static str,
        code: i64,
        message: String,
    },

    #[error("failed to sign {channel} request: {reason}")]
    Signing {
        channel: &'static str,
        reason: String,
    },
}
