//! HPI interview state machine.
//!
//! ```text
//! NotStarted ──start──▶ AwaitingQuestion ──question──▶ AwaitingAnswer
//!                          ▲      │                        │
//!                          │      └──[HPI_COMPLETE]──▶ Complete
//!                          └────────────answer─────────────┘
//! ```
//!
//! A failed or cancelled request leaves the phase on `AwaitingQuestion`
//! until the turn is retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use historia_core::models::chat_history::{ChatHistory, ChatHistoryRole};
use historia_core::models::screen::Screen;

use crate::error::IntakeError;
use crate::navigator;

/// Shown in place of a question when a turn fails.
pub const CONNECTION_NOTICE: &str = "Error connecting to AI. Please try again.";

/// Shown once the model signals the interview is complete.
pub const CLOSING_MESSAGE: &str = "Thank you. We've completed the detailed analysis.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewPhase {
    NotStarted,
    /// A request is in flight, or the last one failed and awaits retry.
    AwaitingQuestion,
    AwaitingAnswer,
    Complete,
}

/// How the patient answers the pending question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    /// Tappable options, any number selectable, submitted with one confirm.
    Choices(OptionSelection),
    /// Free text. `speech_assist` lets a front-end offer dictation.
    FreeText { speech_assist: bool },
}

/// A question waiting for the patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub text: String,
    pub input: AnswerInput,
}

impl PendingQuestion {
    pub fn new(text: String, options: Vec<String>) -> Self {
        let input = if options.is_empty() {
            AnswerInput::FreeText {
                speech_assist: true,
            }
        } else {
            AnswerInput::Choices(OptionSelection::new(options))
        };
        Self { text, input }
    }
}

/// Multi-select state over a question's options.
///
/// Selection order is kept so the confirmed answer lists options in the
/// order they were tapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSelection {
    options: Vec<String>,
    selected: Vec<usize>,
}

impl OptionSelection {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            options,
            selected: Vec::new(),
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Select or deselect the option at `index`.
    pub fn toggle(&mut self, index: usize) -> Result<(), IntakeError> {
        if index >= self.options.len() {
            return Err(IntakeError::NoSuchOption(index));
        }
        match self.selected.iter().position(|&i| i == index) {
            Some(at) => {
                self.selected.remove(at);
            }
            None => self.selected.push(index),
        }
        Ok(())
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected options joined with `", "`, or `None` if nothing is selected.
    pub fn answer(&self) -> Option<String> {
        if self.selected.is_empty() {
            return None;
        }
        let parts: Vec<&str> = self
            .selected
            .iter()
            .map(|&i| self.options[i].as_str())
            .collect();
        Some(parts.join(", "))
    }
}

/// Result of one interview turn, for the front-end to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Question(PendingQuestion),
    /// Show `farewell`, then call `advance_after_interview` after `advance_in`.
    Complete {
        farewell: &'static str,
        advance_in: Duration,
    },
    /// The request failed. Show `notice` and offer a retry.
    Failed { notice: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InterviewState {
    pub phase: InterviewPhase,
    pub pending: Option<PendingQuestion>,
}

impl InterviewState {
    pub fn new() -> Self {
        Self {
            phase: InterviewPhase::NotStarted,
            pending: None,
        }
    }

    /// Rebuild the interview position from a saved chat history.
    ///
    /// Options are not saved, so a restored question is always free text.
    pub fn restore(screen: Screen, history: &ChatHistory, complete: bool) -> Self {
        if navigator::is_past_interview(screen) || (screen == Screen::HpiChat && complete) {
            return Self {
                phase: InterviewPhase::Complete,
                pending: None,
            };
        }
        if screen != Screen::HpiChat {
            return Self::new();
        }
        match history.last() {
            None => Self::new(),
            Some(m) if m.role == ChatHistoryRole::Assistant => Self {
                phase: InterviewPhase::AwaitingAnswer,
                pending: Some(PendingQuestion::new(m.content.clone(), Vec::new())),
            },
            Some(_) => Self {
                phase: InterviewPhase::AwaitingQuestion,
                pending: None,
            },
        }
    }
}

/// At-most-one-request flag shared by a session and its handles.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn try_acquire(&self) -> Result<InFlightGuard, IntakeError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| IntakeError::Busy)?;
        Ok(InFlightGuard(self.0.clone()))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the in-flight flag when dropped, including on early return or
/// when the request future is dropped.
#[derive(Debug)]
pub(crate) struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
