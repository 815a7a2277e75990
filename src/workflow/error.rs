use chrono::NaiveDate;

use crate::model::{BalanceError, LeaveDays, LeaveStatus, LeaveType};
use crate::store::StoreError;

/// Typed failures returned to the caller of a workflow operation.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("from_date {from} is after to_date {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
    #[error("leave must span a positive number of days")]
    InvalidDuration,
    #[error("a reason is required")]
    MissingReason,
    #[error("leave request {0} not found")]
    NotFound(u64),
    #[error("notification {0} not found")]
    NotificationNotFound(u64),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("cannot move a {from} request to {to}")]
    InvalidTransition { from: LeaveStatus, to: LeaveStatus },
    #[error("insufficient {leave_type} balance: {available} day(s) available, {requested} requested")]
    InsufficientBalance {
        leave_type: LeaveType,
        available: LeaveDays,
        requested: LeaveDays,
    },
    #[error("leave request {0} was modified concurrently; re-read and retry")]
    Conflict(u64),
    #[error(transparent)]
    Store(StoreError),
}

impl WorkflowError {
    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::InvalidDateRange { .. } => "invalid_date_range",
            WorkflowError::InvalidDuration => "invalid_duration",
            WorkflowError::MissingReason => "missing_reason",
            WorkflowError::NotFound(_) | WorkflowError::NotificationNotFound(_) => "not_found",
            WorkflowError::Forbidden(_) => "forbidden",
            WorkflowError::InvalidTransition { .. } => "invalid_transition",
            WorkflowError::InsufficientBalance { .. } => "insufficient_balance",
            WorkflowError::Conflict(_) => "conflict",
            WorkflowError::Store(_) => "internal",
        }
    }

    /// Only a stale read may succeed on an immediate retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::Conflict(_) | WorkflowError::Store(_))
    }
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => WorkflowError::NotFound(id),
            StoreError::Conflict(id) => WorkflowError::Conflict(id),
            StoreError::Balance(BalanceError::Insufficient {
                leave_type,
                available,
                requested,
            }) => WorkflowError::InsufficientBalance {
                leave_type,
                available,
                requested,
            },
            other => WorkflowError::Store(other),
        }
    }
}
