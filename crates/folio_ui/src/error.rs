use thiserror::Error;

use crate::backend::BackendError;
use crate::validity::ValidityReport;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error("no modal is open")]
    NotOpen,

    #[error("a modal is already open")]
    AlreadyOpen,

    #[error("a page is still loading")]
    Busy,

    #[error("cannot move from page {from} to page {to}")]
    InvalidTransition { from: usize, to: usize },

    #[error("the error page must be dismissed first")]
    ErrorPending,

    #[error("form has {} invalid field(s)", .0.issues.len())]
    ValidationFailed(ValidityReport),

    #[error("cannot load page: {0}")]
    SchemaFetch(BackendError),

    #[error("submission failed: {0}")]
    Submission(BackendError),

    #[error("a submission is in flight")]
    SubmissionInFlight,

    #[error("submit is only available on the last page")]
    NotFinalPage,

    #[error("modal has no action to submit")]
    NoAction,
}
