//! One-shot clinical summary: prompt construction and reply extraction.

use historia_core::models::intake::ApplicationState;
use historia_core::models::summary::ClinicalSummary;

use crate::error::CompletionError;

pub const HPI_MARKER: &str = "History of Presenting Illness:";
pub const DIAGNOSES_MARKER: &str = "Probable Diagnoses:";

pub const MISSING_HPI: &str = "Could not generate HPI summary.";
pub const MISSING_DIAGNOSES: &str = "Could not generate diagnoses.";

/// Build the summary prompt from the full application state.
///
/// Sent as the only message of the request; the interview chat history is
/// not included except through `hpi_conversation`.
pub fn summary_prompt(state: &ApplicationState) -> String {
    let transcript = state
        .hpi_conversation
        .iter()
        .map(|e| format!("AI: {}\nPatient: {}", e.question, e.answer))
        .collect::<Vec<_>>()
        .join("\n");

    let p = &state.preliminary;
    let cc = &state.chief_complaint;
    let mut prompt = String::from(
        "You are a Differential Diagnosis Expert AI for a clinical setting in India. \
         Analyze the following comprehensive patient data.\n\n**PATIENT DATA:**\n",
    );
    prompt.push_str(&format!(
        "- **Demographics:** {}, {}, {}\n\
         - **Chief Complaint:** {} for {}\n\
         - **Past History:** Surgeries: {}. Medications: {}.\n\
         - **Social History:** Tobacco: {}, Alcohol: {}\n\
         - **Lab Reports:** {}\n\
         - **HPI Conversation Transcript:**\n{transcript}\n",
        p.name,
        p.age,
        p.sex,
        cc.symptom,
        cc.duration,
        or(&state.history.surgeries, "None"),
        or(&state.history.medications, "None"),
        state.social.tobacco,
        state.social.alcohol,
        or(&state.lab_reports, "Not provided."),
    ));
    prompt.push_str(
        "\n**YOUR TASK:**\n\
         1. **Synthesize HPI:** Write a concise, narrative \"History of Presenting Illness\" \
         paragraph in a formal clinical style. Integrate pertinent positives and negatives \
         from the conversation.\n\
         2. **Analyze Labs:** Explicitly mention any significant findings from the lab reports \
         and correlate them with the clinical picture.\n\
         3. **Provide Differential Diagnosis:** List 3-5 \"Probable Diagnoses\", most likely \
         first, each with a brief (1-2 sentence) justification based on the patient's data.\n\n\
         **FORMAT YOUR RESPONSE EXACTLY LIKE THIS:**\n\n",
    );
    prompt.push_str(&format!(
        "{HPI_MARKER}\n[Your summary paragraph here]\n\n{DIAGNOSES_MARKER}\n\
         1. **[Diagnosis 1]:** [Your brief justification here]\n\
         2. **[Diagnosis 2]:** [Your brief justification here]\n\
         3. **[Diagnosis 3]:** [Your brief justification here]\n"
    ));
    prompt
}

fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

/// Extract the summary, rejecting anything off-format.
///
/// Each marker must appear exactly once, the HPI marker first, and both
/// sections must have content.
pub fn parse_summary_strict(reply: &str) -> Result<ClinicalSummary, CompletionError> {
    let hpi_count = reply.matches(HPI_MARKER).count();
    let dx_count = reply.matches(DIAGNOSES_MARKER).count();
    if hpi_count != 1 || dx_count != 1 {
        return Err(violation(format!(
            "expected each section header once, found {hpi_count} HPI and {dx_count} diagnoses headers"
        )));
    }

    let (Some(hpi_at), Some(dx_at)) = (reply.find(HPI_MARKER), reply.find(DIAGNOSES_MARKER))
    else {
        return Err(violation("missing section header".to_string()));
    };
    if dx_at < hpi_at {
        return Err(violation("diagnoses section precedes the HPI section".to_string()));
    }

    let narrative = reply[hpi_at + HPI_MARKER.len()..dx_at].trim();
    let diagnoses = reply[dx_at + DIAGNOSES_MARKER.len()..].trim();
    if narrative.is_empty() {
        return Err(violation("HPI section is empty".to_string()));
    }
    if diagnoses.is_empty() {
        return Err(violation("diagnoses section is empty".to_string()));
    }

    Ok(ClinicalSummary::new(narrative, diagnoses))
}

/// Extract the summary, substituting placeholder text for missing sections.
///
/// The narrative is the text between the first HPI marker and the first
/// diagnoses marker that follows it; the diagnoses are everything after the
/// first diagnoses marker.
pub fn parse_summary_with_fallback(reply: &str) -> ClinicalSummary {
    let narrative = reply.find(HPI_MARKER).and_then(|at| {
        let rest = &reply[at + HPI_MARKER.len()..];
        rest.find(DIAGNOSES_MARKER).map(|end| rest[..end].trim())
    });
    let diagnoses = reply
        .find(DIAGNOSES_MARKER)
        .map(|at| reply[at + DIAGNOSES_MARKER.len()..].trim());

    ClinicalSummary::new(
        narrative.unwrap_or(MISSING_HPI),
        diagnoses.unwrap_or(MISSING_DIAGNOSES),
    )
}

fn violation(reason: String) -> CompletionError {
    CompletionError::SchemaViolation(format!("summary reply: {reason}"))
}
