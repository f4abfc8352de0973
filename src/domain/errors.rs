use thiserror::Error;

use crate::domain::entities::JobStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid transition: cannot {event} a job in {from} status")]
    InvalidTransition {
        from: JobStatus,
        event: &'static str,
    },
    #[error("OTP does not match")]
    OtpMismatch,
    #[error("Job not found: {0}")]
    JobNotFound(String),
    #[error("No active job")]
    NoActiveJob,
    #[error("Job {0} is already active")]
    JobAlreadyActive(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
