use chrono::{DateTime, Utc};

use crate::domain::entities::{Job, JobEvent, JobStatus};
use crate::domain::errors::{DispatchError, DispatchResult};

/// Result of applying an event to a job
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub previous: JobStatus,
    pub job: Job,
}

/// Resolve the status an event leads to from `from`, or reject it
pub fn validate_transition(from: JobStatus, event: &JobEvent) -> DispatchResult<JobStatus> {
    use JobStatus::*;

    match (from, event) {
        (Searching, JobEvent::Offer) => Ok(Offered),
        (Searching, JobEvent::Cancel) => Ok(Cancelled),
        (Offered, JobEvent::Decline) => Ok(Searching),
        (Offered, JobEvent::Accept { .. }) => Ok(Accepted),
        (Accepted, JobEvent::Arrive) => Ok(Arrived),
        (Arrived, JobEvent::Start) => Ok(InProgress),
        (InProgress, JobEvent::Complete { .. }) => Ok(Completed),

        // All other transitions are invalid
        _ => Err(DispatchError::InvalidTransition {
            from,
            event: event.name(),
        }),
    }
}

/// Apply an event to a job, producing the updated snapshot.
///
/// The input job is never touched; on error the caller still holds the
/// exact pre-call state.
pub fn apply_transition(
    job: &Job,
    event: &JobEvent,
    now: DateTime<Utc>,
) -> DispatchResult<Transition> {
    let next_status = validate_transition(job.status, event)?;

    let mut next = job.clone();
    match event {
        JobEvent::Accept { technician_id } => {
            next.technician_id = Some(technician_id.clone());
        }
        JobEvent::Complete { otp } => {
            if *otp != job.otp {
                return Err(DispatchError::OtpMismatch);
            }
        }
        _ => {}
    }

    next.status = next_status;
    next.updated_at = now;

    tracing::debug!(
        "Job {} transition {} -> {} on {}",
        job.id,
        job.status,
        next_status,
        event.name()
    );

    Ok(Transition {
        previous: job.status,
        job: next,
    })
}
