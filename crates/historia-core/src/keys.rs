//! Durable storage key and artifact naming conventions.
//!
//! Pure string functions, no storage dependency. A saved session is the
//! three snapshot keys below; the absence of any one means there is no
//! saved session.

pub const STATE: &str = "historia_appState";

pub const CHAT_HISTORY: &str = "historia_chatHistory";

pub const CURRENT_SCREEN: &str = "historia_currentScreen";

/// Snapshot keys in write order. The screen key goes last so that its
/// presence marks a complete snapshot.
pub const SNAPSHOT_KEYS: [&str; 3] = [STATE, CHAT_HISTORY, CURRENT_SCREEN];

/// File name of an exported report, e.g. `Historia_AI_Summary_Asha_Rao.pdf`.
pub fn export_filename(patient_name: &str, extension: &str) -> String {
    let name = patient_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("Historia_AI_Summary_{name}.{extension}")
}
