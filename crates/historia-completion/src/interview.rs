//! The HPI interview: system prompt, opening message, and reply parsing.
//!
//! Replies follow a small text contract:
//!
//! - `[HPI_COMPLETE]` alone ends the interview;
//! - `Question text [Option 1|Option 2|Option 3]` asks with tappable options;
//! - anything without brackets is a free-text question.
//!
//! Parsing is strict. A reply that does not fit is a
//! [`CompletionError::SchemaViolation`] rather than a best guess.

use historia_core::models::intake::ApplicationState;

use crate::error::CompletionError;

/// The reply that ends the interview.
pub const COMPLETION_TOKEN: &str = "[HPI_COMPLETE]";

pub const INTERVIEW_SYSTEM_PROMPT: &str = "\
You are Historia AI, an expert clinical history-taking assistant. Your goal is to conduct a \
detailed History of Presenting Illness (HPI) with a patient.
1. Follow the OLD CARTS mnemonic (Onset, Location, Duration, Character, Associated Symptoms, \
Radiation, Timing, Severity) to analyze the chief complaint.
2. Ask one clear question at a time.
3. When suitable, provide 3-4 short, tappable options. Format your response as: \
\"Question text [OPTION 1|OPTION 2|OPTION 3]\". Use square brackets only for the options.
4. Keep your tone empathetic and professional.
5. After you have thoroughly covered all aspects of OLD CARTS, end your turn by responding \
with only the text: [HPI_COMPLETE]";

/// The synthetic user message that opens the interview.
pub fn opening_message(state: &ApplicationState) -> String {
    format!(
        "Start of consultation. Patient: {}, {}. Chief Complaint: {} for {}.",
        state.preliminary.name,
        state.preliminary.age,
        state.chief_complaint.symptom,
        state.chief_complaint.duration,
    )
}

/// A parsed interview reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewReply {
    /// The model has covered everything; no further questions.
    Complete,
    /// A question, with options when the model offered them.
    Question { text: String, options: Vec<String> },
}

/// Parse a normalized reply from the completion service.
pub fn parse_interview_reply(reply: &str) -> Result<InterviewReply, CompletionError> {
    let trimmed = reply.trim();

    if trimmed == COMPLETION_TOKEN {
        return Ok(InterviewReply::Complete);
    }
    if trimmed.contains(COMPLETION_TOKEN) {
        return Err(violation("completion token must be sent on its own"));
    }

    let opens = trimmed.matches('[').count();
    let closes = trimmed.matches(']').count();

    if opens == 0 && closes == 0 {
        if trimmed.is_empty() {
            return Err(violation("empty reply"));
        }
        return Ok(InterviewReply::Question {
            text: trimmed.to_string(),
            options: Vec::new(),
        });
    }

    if opens != 1 || closes != 1 {
        return Err(violation("expected exactly one bracketed option group"));
    }
    if !trimmed.ends_with(']') {
        return Err(violation("option group must end the reply"));
    }

    // One '[' and the reply ends with the only ']', so the group is the tail.
    let Some(open) = trimmed.find('[') else {
        return Err(violation("unbalanced option group"));
    };
    let text = trimmed[..open].trim();
    let group = &trimmed[open + 1..trimmed.len() - 1];

    if text.is_empty() {
        return Err(violation("reply has options but no question"));
    }

    let options: Vec<String> = group
        .split('|')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if options.is_empty() {
        return Err(violation("option group is empty"));
    }

    Ok(InterviewReply::Question {
        text: text.to_string(),
        options,
    })
}

fn violation(reason: &str) -> CompletionError {
    CompletionError::SchemaViolation(format!("interview reply: {reason}"))
}
