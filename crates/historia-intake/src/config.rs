use std::time::Duration;

/// Behaviour knobs for an [`IntakeSession`](crate::session::IntakeSession).
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// How long the closing interview message stays up before the session
    /// moves on to past history.
    pub completion_display_delay: Duration,
    /// Accept off-format summaries, substituting placeholder text for
    /// missing sections, instead of rejecting them.
    pub summary_fallback: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            completion_display_delay: Duration::from_secs(2),
            summary_fallback: false,
        }
    }
}
