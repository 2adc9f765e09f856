use serde::Serialize;

use historia_core::models::intake::ApplicationState;
use historia_core::models::summary::ClinicalSummary;

pub const REPORT_TITLE: &str = "Historia AI";
pub const REPORT_SUBTITLE: &str = "Clinical Summary Report";
pub const DISCLAIMER: &str = "Disclaimer: AI-generated content. Verify with a professional.";

/// Footer stamped on every page of an exported report.
pub fn page_footer(page: usize, total: usize) -> String {
    format!("Generated by {REPORT_TITLE} - Page {page} of {total} - {DISCLAIMER}")
}

/// The report content, fixed in order, independent of output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub patient: String,
    pub age_sex: String,
    pub date: String,
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: &'static str,
    /// One entry per source line; wrapping is up to the renderer.
    pub lines: Vec<String>,
}

impl ReportSection {
    fn new(title: &'static str, body: &str) -> Self {
        Self {
            title,
            lines: body.lines().map(|l| l.trim_end().to_string()).collect(),
        }
    }
}

fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

impl ReportDocument {
    pub fn build(state: &ApplicationState, summary: &ClinicalSummary, date: jiff::civil::Date) -> Self {
        let p = &state.preliminary;
        let cc = &state.chief_complaint;

        let past_and_social = format!(
            "Surgeries: {}\nMedications: {}\nTobacco: {}\nAlcohol: {}",
            or(&state.history.surgeries, "None"),
            or(&state.history.medications, "None"),
            state.social.tobacco,
            state.social.alcohol,
        );

        Self {
            title: REPORT_TITLE,
            subtitle: REPORT_SUBTITLE,
            patient: or(&p.name, "N/A").to_string(),
            age_sex: format!("{} / {}", or(&p.age, "N/A"), or(&p.sex, "N/A")),
            date: date.to_string(),
            sections: vec![
                ReportSection::new(
                    "1. Chief Complaint",
                    &format!("{} ({})", cc.symptom, cc.duration),
                ),
                ReportSection::new("2. History of Presenting Illness", &summary.hpi_narrative),
                ReportSection::new("3. Past & Social History", &past_and_social),
                ReportSection::new("4. Lab Findings", or(&state.lab_reports, "None provided.")),
                ReportSection::new(
                    "5. Assessment & Plan (AI Suggestions)",
                    &summary.diagnoses,
                ),
            ],
        }
    }
}
