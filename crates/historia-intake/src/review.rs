use historia_core::models::intake::ApplicationState;
use historia_core::models::screen::Screen;

/// One block of the review sheet, with the form screen that edits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSection {
    pub title: &'static str,
    pub edit_target: Screen,
    pub lines: Vec<String>,
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

fn or_none(value: &str) -> &str {
    if value.is_empty() { "None" } else { value }
}

/// Everything entered so far, grouped for confirmation before the summary.
pub fn review_sheet(state: &ApplicationState) -> Vec<ReviewSection> {
    let p = &state.preliminary;
    let cc = &state.chief_complaint;
    vec![
        ReviewSection {
            title: "Preliminary Data",
            edit_target: Screen::Preliminary,
            lines: vec![
                format!("Name: {}", or_na(&p.name)),
                format!("Age: {}", or_na(&p.age)),
                format!("Sex: {}", or_na(&p.sex)),
            ],
        },
        ReviewSection {
            title: "Chief Complaint",
            edit_target: Screen::ChiefComplaint,
            lines: vec![format!("{} for {}", or_na(&cc.symptom), or_na(&cc.duration))],
        },
        ReviewSection {
            title: "Past History",
            edit_target: Screen::PastHistory,
            lines: vec![
                format!("Surgeries: {}", or_none(&state.history.surgeries)),
                format!("Medications: {}", or_none(&state.history.medications)),
            ],
        },
        ReviewSection {
            title: "Social History",
            edit_target: Screen::SocialHistory,
            lines: vec![
                format!("Tobacco: {}", or_na(&state.social.tobacco)),
                format!("Alcohol: {}", or_na(&state.social.alcohol)),
            ],
        },
        ReviewSection {
            title: "Lab Reports",
            edit_target: Screen::LabReport,
            lines: vec![or_none(&state.lab_reports).to_string()],
        },
    ]
}
