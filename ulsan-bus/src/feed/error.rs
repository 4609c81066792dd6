//! Feed client error types.

/// Errors that can occur when fetching or parsing a station's arrival feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The open-data gateway answered with a service error envelope
    #[error("upstream error {code}: {message}")]
    Upstream { code: String, message: String },

    /// Response body was not the expected document
    #[error("parse error: {message}")]
    Parse {
        message: String,
        body: Option<String>,
    },
}

impl FeedError {
    /// Short code recorded alongside the message when a refresh fails.
    pub fn code(&self) -> String {
        match self {
            FeedError::Http(e) => e
                .status()
                .map_or_else(|| "HTTP".to_string(), |s| s.as_u16().to_string()),
            FeedError::Status { status, .. } => status.to_string(),
            FeedError::Upstream { code, .. } => code.clone(),
            FeedError::Parse { .. } => "PARSE".to_string(),
        }
    }

    /// Excerpt of the offending response body, if one was kept.
    pub fn body_excerpt(&self) -> Option<&str> {
        match self {
            FeedError::Parse { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}
