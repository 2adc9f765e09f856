use serde::{Deserialize, Serialize};

use super::screen::Screen;

/// Everything the patient has entered so far.
///
/// A single record owned by the running session. Every field starts empty
/// and is filled in by the form screens and the HPI interview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationState {
    #[serde(default)]
    pub preliminary: Preliminary,
    #[serde(default)]
    pub chief_complaint: ChiefComplaint,
    #[serde(default)]
    pub history: PastHistory,
    #[serde(default)]
    pub social: SocialHistory,
    #[serde(default)]
    pub lab_reports: String,
    #[serde(default)]
    pub hpi_conversation: Vec<HpiExchange>,
    /// Screen to return to once an edit started from the review screen is
    /// re-submitted. Cleared exactly once, by [`ApplicationState::finish_edit`].
    #[serde(default)]
    pub editing_target: Option<Screen>,
    /// Set once the assistant ends the interview, so a session resumed on
    /// the chat screen can advance without asking again.
    #[serde(default)]
    pub hpi_complete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preliminary {
    pub name: String,
    pub age: String,
    pub sex: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChiefComplaint {
    pub symptom: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastHistory {
    pub surgeries: String,
    pub medications: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialHistory {
    pub tobacco: String,
    pub alcohol: String,
}

/// One interview turn: the assistant's question and the patient's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpiExchange {
    pub question: String,
    pub answer: String,
}

impl ApplicationState {
    /// Read a form-bound field by its schema id.
    pub fn field(&self, id: &str) -> Option<&str> {
        let value = match id {
            "name" => &self.preliminary.name,
            "age" => &self.preliminary.age,
            "sex" => &self.preliminary.sex,
            "cc-symptom" => &self.chief_complaint.symptom,
            "cc-duration" => &self.chief_complaint.duration,
            "psh-details" => &self.history.surgeries,
            "meds-details" => &self.history.medications,
            "social-tobacco" => &self.social.tobacco,
            "social-alcohol" => &self.social.alcohol,
            "lab-reports" => &self.lab_reports,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Mutable access to a form-bound field by its schema id.
    pub fn field_mut(&mut self, id: &str) -> Option<&mut String> {
        let value = match id {
            "name" => &mut self.preliminary.name,
            "age" => &mut self.preliminary.age,
            "sex" => &mut self.preliminary.sex,
            "cc-symptom" => &mut self.chief_complaint.symptom,
            "cc-duration" => &mut self.chief_complaint.duration,
            "psh-details" => &mut self.history.surgeries,
            "meds-details" => &mut self.history.medications,
            "social-tobacco" => &mut self.social.tobacco,
            "social-alcohol" => &mut self.social.alcohol,
            "lab-reports" => &mut self.lab_reports,
            _ => return None,
        };
        Some(value)
    }

    pub fn begin_edit(&mut self, return_to: Screen) {
        self.editing_target = Some(return_to);
    }

    /// Clear the edit marker, returning where the edit should land.
    pub fn finish_edit(&mut self) -> Option<Screen> {
        self.editing_target.take()
    }

    pub fn is_editing(&self) -> bool {
        self.editing_target.is_some()
    }

    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.hpi_conversation.push(HpiExchange {
            question: question.into(),
            answer: answer.into(),
        });
    }
}
