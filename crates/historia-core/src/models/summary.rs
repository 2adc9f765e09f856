use serde::{Deserialize, Serialize};

/// The parsed output of the one-shot summary request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalSummary {
    /// Narrative History of Presenting Illness paragraph.
    pub hpi_narrative: String,
    /// Probable diagnoses, most likely first, as returned by the model.
    pub diagnoses: String,
    pub generated_at: jiff::Timestamp,
}

impl ClinicalSummary {
    pub fn new(hpi_narrative: impl Into<String>, diagnoses: impl Into<String>) -> Self {
        Self {
            hpi_narrative: hpi_narrative.into(),
            diagnoses: diagnoses.into(),
            generated_at: jiff::Timestamp::now(),
        }
    }

    /// Non-empty lines of the diagnosis list.
    pub fn diagnosis_lines(&self) -> Vec<&str> {
        self.diagnoses
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}
