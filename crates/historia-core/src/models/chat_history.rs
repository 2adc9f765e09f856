use serde::{Deserialize, Serialize};

/// The running HPI conversation with the completion service.
///
/// Append-only during an interview. Doubles as the transcript shown to the
/// patient and as the context window sent with every interview request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatHistory {
    pub messages: Vec<ChatHistoryMessage>,
}

/// A single message in the chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryMessage {
    pub role: ChatHistoryRole,
    pub content: String,
    pub timestamp: jiff::Timestamp,
}

/// Role of a chat history message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatHistoryRole {
    User,
    Assistant,
}

impl ChatHistory {
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(ChatHistoryRole::User, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(ChatHistoryRole::Assistant, content.into());
    }

    fn push(&mut self, role: ChatHistoryRole, content: String) {
        self.messages.push(ChatHistoryMessage {
            role,
            content,
            timestamp: jiff::Timestamp::now(),
        });
    }

    pub fn last(&self) -> Option<&ChatHistoryMessage> {
        self.messages.last()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatHistoryMessage> {
        self.messages.iter()
    }
}
