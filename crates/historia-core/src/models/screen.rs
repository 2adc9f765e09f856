use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One step of the intake wizard. Exactly one screen is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Welcome,
    Preliminary,
    ChiefComplaint,
    HpiChat,
    PastHistory,
    SocialHistory,
    LabReport,
    Review,
    LoadingSummary,
    Summary,
}

impl Screen {
    /// Every screen, in forward workflow order.
    pub const ALL: [Screen; 10] = [
        Screen::Welcome,
        Screen::Preliminary,
        Screen::ChiefComplaint,
        Screen::HpiChat,
        Screen::PastHistory,
        Screen::SocialHistory,
        Screen::LabReport,
        Screen::Review,
        Screen::LoadingSummary,
        Screen::Summary,
    ];

    /// Stable identifier used in snapshots and by front-ends.
    pub fn id(self) -> &'static str {
        match self {
            Screen::Welcome => "welcome",
            Screen::Preliminary => "preliminary",
            Screen::ChiefComplaint => "chief-complaint",
            Screen::HpiChat => "hpi-chat",
            Screen::PastHistory => "past-history",
            Screen::SocialHistory => "social-history",
            Screen::LabReport => "lab-report",
            Screen::Review => "review",
            Screen::LoadingSummary => "loading-summary",
            Screen::Summary => "summary",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Welcome => "Welcome",
            Screen::Preliminary => "Preliminary Data",
            Screen::ChiefComplaint => "Chief Complaint",
            Screen::HpiChat => "History of Presenting Illness",
            Screen::PastHistory => "Past History",
            Screen::SocialHistory => "Social History",
            Screen::LabReport => "Lab Reports",
            Screen::Review => "Review",
            Screen::LoadingSummary => "Generating Summary",
            Screen::Summary => "Clinical Summary",
        }
    }

    /// The forward edge of the workflow. `None` on the last screen.
    pub fn next(self) -> Option<Screen> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    /// Screens backed by a form schema. These are also the only valid
    /// targets of an edit started from the review screen.
    pub fn is_form(self) -> bool {
        matches!(
            self,
            Screen::Preliminary
                | Screen::ChiefComplaint
                | Screen::PastHistory
                | Screen::SocialHistory
                | Screen::LabReport
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Screen {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|screen| screen.id() == s)
            .ok_or_else(|| CoreError::UnknownScreen(s.to_string()))
    }
}
