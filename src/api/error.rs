//! API-specific error types.

/// Errors that can occur during API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The session token was rejected; the session has been cleared
    #[error("Session expired, please sign in again")]
    Unauthorized,

    /// No access token is available for the request
    #[error("Not signed in")]
    NotAuthenticated,

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Failed to deserialize API response
    #[error("Failed to deserialize API response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// API answered a mutation with `success: false`
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    /// Return true if the error ended the session.
    ///
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::NotAuthenticated)
    }
}
