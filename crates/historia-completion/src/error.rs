use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Network(String),

    #[error("completion service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("response did not conform to expected structure: {0}")]
    SchemaViolation(String),
}

impl CompletionError {
    /// Whether retrying the same request could succeed.
    ///
    /// Network failures, timeouts, throttling, and upstream 5xx are
    /// transient; malformed replies and client errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::Network(_) => true,
            CompletionError::Upstream { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            _ => false,
        }
    }
}
