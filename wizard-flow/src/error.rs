use thiserror::Error;

use crate::model::Stage;

/// Errors surfaced to the caller of a wizard operation.
///
/// Collaborator faults are deliberately absent here: they are converted at
/// the boundary into data ([`crate::parser::ParseFailure`] inside an
/// [`crate::model::AiResult`]) and stored in the field a success would have
/// occupied, so a model hiccup can never leave a session mid-transition.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("cannot advance from {stage}: {} requirement(s) unmet", .requirements.len())]
    StageIncomplete {
        stage: Stage,
        requirements: Vec<String>,
    },

    #[error("operation '{operation}' is not valid in stage {stage}")]
    InvalidStage {
        operation: &'static str,
        stage: Stage,
    },

    #[error("unknown paragraph slot: {0}")]
    UnknownSlot(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, WizardError>;
