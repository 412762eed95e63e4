use thiserror::Error;

use crate::job::JobStatus;

pub type QueueResult<T> = Result<T, QueueError>;

/// Why a queue operation left the queue untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("cannot {action} job {id} while {status}")]
    InvalidTransition {
        id: String,
        status: JobStatus,
        action: &'static str,
    },
}

impl QueueError {
    pub fn invalid(id: &str, status: JobStatus, action: &'static str) -> Self {
        QueueError::InvalidTransition {
            id: id.to_string(),
            status,
            action,
        }
    }
}
