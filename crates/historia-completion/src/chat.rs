//! Wire types for the OpenAI-compatible chat completion contract.
//!
//! # Request
//!
//! ```text
//! { "messages": [{ "role": "system" | "user" | "assistant", "content": "..." }, ...],
//!   "tool_choice": "none" }
//! ```
//!
//! The proxy adds `model` before forwarding upstream.
//!
//! # Response
//!
//! ```text
//! { "choices": [{ "message": { "content": "...", "tool_calls": [...] } }] }
//! ```
//!
//! A reply is either direct `content`, or a tool call whose `arguments` is a
//! JSON object `{ "question": "...", "options": ["...", ...] }`. Both are
//! normalized to the same text form, `question [opt 1|opt 2]`.

use serde::{Deserialize, Serialize};

use historia_core::models::chat_history::{ChatHistory, ChatHistoryRole};

use crate::error::CompletionError;

// ── Request ──────────────────────────────────────────────────────────────────

/// A single message in a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

impl CompletionRequest {
    /// A system prompt followed by the running conversation.
    pub fn with_history(system_prompt: &str, history: &ChatHistory) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history.iter().map(|m| match m.role {
            ChatHistoryRole::User => ChatMessage::user(m.content.clone()),
            ChatHistoryRole::Assistant => ChatMessage::assistant(m.content.clone()),
        }));
        Self {
            messages,
            tool_choice: Some("none".to_string()),
        }
    }

    /// A system prompt on its own, with no running context.
    pub fn standalone(system_prompt: &str) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
            tool_choice: Some("none".to_string()),
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub name: String,
    /// JSON-encoded arguments object.
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
struct QuestionArguments {
    question: String,
    #[serde(default)]
    options: Vec<String>,
}

impl CompletionResponse {
    /// Reduce the response to reply text.
    ///
    /// Uses the first choice. Direct content wins; otherwise the first tool
    /// call's `question`/`options` arguments are rendered as
    /// `question [a|b|c]`.
    pub fn into_text(self) -> Result<String, CompletionError> {
        let message = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .ok_or_else(|| CompletionError::ResponseParse("no message in response".to_string()))?;

        if let Some(content) = message.content.filter(|c| !c.trim().is_empty()) {
            return Ok(content);
        }

        let call = message
            .tool_calls
            .and_then(|calls| calls.into_iter().next())
            .ok_or_else(|| {
                CompletionError::ResponseParse("message has neither content nor tool calls".to_string())
            })?;

        let args: QuestionArguments = serde_json::from_str(&call.function.arguments).map_err(|e| {
            CompletionError::ResponseParse(format!(
                "tool call '{}' arguments are not a question: {e}",
                call.function.name
            ))
        })?;

        if args.options.is_empty() {
            Ok(args.question)
        } else {
            Ok(format!("{} [{}]", args.question, args.options.join("|")))
        }
    }
}
