use thiserror::Error;

/// Why a step's executor did not produce a committed payload.
///
/// These are recoverable: the host may retry the same step, retreat (where
/// permitted), or reset the whole flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("step rejected: {0}")]
    Rejected(String),

    #[error("step timed out")]
    Timeout,
}

#[derive(Error, Debug)]
pub enum WizardError {
    /// Malformed step definitions, reported at construction time only.
    #[error("invalid step definitions: {0}")]
    Validation(String),

    /// The executor failed; the machine is in the Error status and the
    /// step can be retried.
    #[error("step execution failed: {0}")]
    Execution(#[from] ExecutionError),

    /// The requested transition is not legal from the current status.
    /// Returned, never panicked, so hosts can treat double submits and
    /// disallowed retreats as ordinary control flow.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

pub type Result<T> = std::result::Result<T, WizardError>;
