//! Error types for the remote cart
//!
//! Every failure the cart service can surface lands in one enum so the
//! reconciliation core can log it and pick a recovery path.

/// Cart service error
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// Storefront base URL could not be parsed
    #[error("invalid storefront url: {0}")]
    InvalidBaseUrl(String),

    /// Request never produced a response
    #[error("transport failed: {0}")]
    Transport(String),

    /// Cart service answered with a non-success status
    #[error("cart service returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response body was not a cart snapshot
    #[error("malformed cart payload: {0}")]
    Decode(String),
}

impl CartError {
    /// Check if a later attempt could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status } => *status == 429 || *status >= 500,
            Self::InvalidBaseUrl(_) | Self::Decode(_) => false,
        }
    }

    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
