use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const INTERNAL_ERROR: &str = "Internal Server Error in the proxy function";
pub const UPSTREAM_ERROR: &str = "Failed to fetch from upstream completion API";

/// Relay failures, each mapped to a fixed JSON envelope.
#[derive(Debug)]
pub enum ProxyError {
    MethodNotAllowed,
    /// The request body is well-formed JSON but not a completion request.
    InvalidRequest(String),
    /// The upstream API answered with a non-success status.
    Upstream { status: StatusCode, details: String },
    /// Anything else: malformed body, network failure, timeout.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ProxyError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed", None),
            ProxyError::InvalidRequest(details) => {
                (StatusCode::BAD_REQUEST, "Invalid completion request", Some(details))
            }
            ProxyError::Upstream { status, details } => {
                tracing::warn!(status = status.as_u16(), "upstream returned an error");
                (status, UPSTREAM_ERROR, Some(details))
            }
            ProxyError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR, None)
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProxyError::Internal(format!("upstream timed out: {e}"))
        } else {
            ProxyError::Internal(format!("upstream request failed: {e}"))
        }
    }
}
