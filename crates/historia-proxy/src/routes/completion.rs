use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use crate::error::ProxyError;
use crate::state::AppState;

/// Relay a chat completion request upstream with the model and credential.
///
/// Successful upstream replies pass through byte for byte, status included.
pub async fn relay(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Response, ProxyError> {
    if method != Method::POST {
        return Err(ProxyError::MethodNotAllowed);
    }

    let mut payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(ProxyError::Internal("request body is not a JSON object".into())),
        Err(e) => return Err(ProxyError::Internal(format!("request body is not JSON: {e}"))),
    };
    validate_messages(&payload)?;
    payload.insert("model".to_string(), Value::String(state.config.model.clone()));

    let upstream = state
        .http
        .post(&state.config.upstream_url)
        .bearer_auth(&state.config.api_key)
        .json(&payload)
        .send()
        .await?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| ProxyError::Internal(e.to_string()))?;
    let bytes = upstream.bytes().await?;

    if !status.is_success() {
        return Err(ProxyError::Upstream {
            status,
            details: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    tracing::debug!(status = status.as_u16(), bytes = bytes.len(), "upstream reply relayed");
    Ok((status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}

/// `messages` must be a non-empty array of `{role, content}` string pairs.
fn validate_messages(payload: &Map<String, Value>) -> Result<(), ProxyError> {
    let messages = payload
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| ProxyError::InvalidRequest("'messages' must be an array".into()))?;

    if messages.is_empty() {
        return Err(ProxyError::InvalidRequest("'messages' is empty".into()));
    }

    for (i, message) in messages.iter().enumerate() {
        let role = message.get("role").and_then(Value::as_str);
        let content = message.get("content").and_then(Value::as_str);
        if role.is_none() || content.is_none() {
            return Err(ProxyError::InvalidRequest(format!(
                "messages[{i}] must have string 'role' and 'content'"
            )));
        }
    }
    Ok(())
}
