use thiserror::Error;

use historia_completion::error::CompletionError;
use historia_core::models::screen::Screen;
use historia_storage::error::StorageError;

use crate::forms::ValidationReport;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("{0}")]
    Validation(ValidationReport),

    #[error("unknown screen: {0}")]
    UnknownScreen(String),

    #[error("cannot {action} while on the {screen} screen")]
    InvalidTransition { screen: Screen, action: &'static str },

    #[error("the interview is not accepting input")]
    InterviewNotActive,

    #[error("answer is empty")]
    EmptyAnswer,

    #[error("no option selected")]
    NoSelection,

    #[error("option {0} does not exist")]
    NoSuchOption(usize),

    #[error("a completion request is already in flight")]
    Busy,

    #[error("completion request cancelled")]
    Cancelled,

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("text recognition failed: {0}")]
    Recognition(String),
}
