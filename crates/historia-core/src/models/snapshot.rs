use serde::{Deserialize, Serialize};

use super::chat_history::ChatHistory;
use super::intake::ApplicationState;
use super::screen::Screen;

/// The durable copy of a session, written after every state-affecting action
/// and read once at startup to resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub state: ApplicationState,
    pub chat_history: ChatHistory,
    pub active_screen: Screen,
}
