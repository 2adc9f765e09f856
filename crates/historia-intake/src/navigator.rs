//! Screen transitions.

use historia_core::models::screen::Screen;

use crate::error::IntakeError;

/// Parse a screen id, rejecting anything outside the known set.
pub fn parse_screen(id: &str) -> Result<Screen, IntakeError> {
    id.parse::<Screen>()
        .map_err(|_| IntakeError::UnknownScreen(id.to_string()))
}

/// The forward edge from `screen`.
pub fn next_screen(screen: Screen) -> Option<Screen> {
    screen.next()
}

/// Where a submitted form screen leads when no edit is in flight.
/// `None` for screens without a form.
pub fn after_submit(screen: Screen) -> Option<Screen> {
    screen.is_form().then(|| next_screen(screen)).flatten()
}

/// The screen a saved session reopens on.
///
/// The summary itself is not saved, so both summary screens reopen on the
/// review sheet.
pub fn resume_screen(saved: Screen) -> Screen {
    match saved {
        Screen::Summary | Screen::LoadingSummary => Screen::Review,
        other => other,
    }
}

/// Whether the interview happens before `screen` in the workflow.
pub fn is_past_interview(screen: Screen) -> bool {
    matches!(
        screen,
        Screen::PastHistory
            | Screen::SocialHistory
            | Screen::LabReport
            | Screen::Review
            | Screen::LoadingSummary
            | Screen::Summary
    )
}
