//! Error taxonomy of the wizard workflow

use crate::draft::DraftStoreError;
use crate::submission::MarshalError;
use crate::wizard::{FieldError, StepRejection};
use thiserror::Error;

/// Message shown when an unexpected failure is caught at the submission boundary
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors of the wizard workflow. None of them is fatal: each resolves to a
/// field message, a notification or a blocked transition.
#[derive(Debug, Error)]
pub enum WizardError {
    /// Validation errors blocking a step transition or submission
    #[error("{}", .0.summary())]
    StepRejected(StepRejection),

    #[error("submit is only available on the last step")]
    NotOnLastStep,

    #[error("a submission is already in progress")]
    SubmissionPending,

    /// The asset store failed; nothing was submitted
    #[error("upload failed: {0}")]
    Upload(String),

    /// The backend answered with `success: false`
    #[error("{0}")]
    Mutation(String),

    /// A draft payload failed the entity's full schema and was not written
    #[error("draft rejected: {} invalid field(s)", .0.len())]
    DraftRejected(Vec<FieldError>),

    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error(transparent)]
    DraftStore(#[from] DraftStoreError),

    /// Network failures and other defects
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl WizardError {
    /// Message suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            WizardError::StepRejected(rejection) => rejection.summary(),
            WizardError::NotOnLastStep => "Complete every step before submitting".to_string(),
            WizardError::SubmissionPending => "Already submitting, please wait".to_string(),
            WizardError::Upload(message) => {
                format!("Media upload failed: {message}. Your changes are kept, try again.")
            }
            WizardError::Mutation(message) => message.clone(),
            WizardError::DraftRejected(errors) => format!(
                "Draft not saved: {} field(s) need attention",
                errors.len()
            ),
            WizardError::Marshal(MarshalError::UnresolvedAsset { .. }) => {
                "Media files must finish uploading before submitting".to_string()
            }
            WizardError::Marshal(_) | WizardError::DraftStore(_) | WizardError::Unexpected(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl From<StepRejection> for WizardError {
    fn from(rejection: StepRejection) -> Self {
        WizardError::StepRejected(rejection)
    }
}
