//! Persistence ports for the leave workflow and their adapters.
//!
//! The engine only sees these traits. `MySqlStore` backs the service;
//! `InMemoryStore` backs tests and local runs. Both honour the same
//! contract for [`RequestStore::commit_transition`]: the status write and the
//! balance charge land together or not at all, and a stale
//! `expected_version` fails with [`StoreError::Conflict`].

pub mod memory;
pub mod mysql;

use async_trait::async_trait;

use crate::model::{
    AcademicYear, BalanceError, Department, LeaveBalance, LeaveDays, LeaveRequest, LeaveStatus,
    LeaveType, NewLeaveRequest, NewNotification, Notification, Profile,
};

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("leave request {0} not found")]
    NotFound(u64),
    #[error("leave request {0} changed since it was read")]
    Conflict(u64),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Balance side effect of an approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageCharge {
    pub user_id: u64,
    pub leave_type: LeaveType,
    pub academic_year: AcademicYear,
    pub days: LeaveDays,
}

/// A status change the engine has already authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub request_id: u64,
    pub expected_version: u32,
    pub new_status: LeaveStatus,
    pub approved_by: u64,
    pub charge: Option<UsageCharge>,
}

/// Predicates behind the list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFilter {
    Requester(u64),
    Department(u64),
    Institution,
    /// `status = forwarded OR leave_type = od`
    ForwardedOrOd,
}

impl RequestFilter {
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        match self {
            RequestFilter::Requester(user_id) => request.requester_id == *user_id,
            RequestFilter::Department(department_id) => {
                request.department_id == Some(*department_id)
            }
            RequestFilter::Institution => true,
            RequestFilter::ForwardedOrOd => {
                request.status == LeaveStatus::Forwarded || request.leave_type == LeaveType::Od
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub const MAX_PER_PAGE: u32 = 100;

    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(10).clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub page: Page,
    pub total: u64,
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert_request(&self, new: NewLeaveRequest) -> Result<LeaveRequest, StoreError>;

    async fn fetch_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError>;

    /// Applies an authorized status change and its balance charge atomically.
    async fn commit_transition(&self, change: StatusChange) -> Result<LeaveRequest, StoreError>;

    /// Matching requests, newest first.
    async fn list_requests(
        &self,
        filter: RequestFilter,
        page: Page,
    ) -> Result<Paged<LeaveRequest>, StoreError>;
}

#[async_trait]
pub trait BalanceLedger: Send + Sync {
    /// Seeded rows only; callers fill in missing types.
    async fn balances(
        &self,
        user_id: u64,
        academic_year: AcademicYear,
    ) -> Result<Vec<LeaveBalance>, StoreError>;
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn profile(&self, user_id: u64) -> Result<Option<Profile>, StoreError>;

    async fn department(&self, department_id: u64) -> Result<Option<Department>, StoreError>;

    async fn department_head(&self, department_id: u64) -> Result<Option<u64>, StoreError>;

    async fn principal(&self) -> Result<Option<u64>, StoreError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: NewNotification) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// Newest first.
    async fn notifications_for(&self, user_id: u64) -> Result<Vec<Notification>, StoreError>;

    /// `false` if the notification does not exist or belongs to someone else.
    async fn mark_read(&self, user_id: u64, notification_id: u64) -> Result<bool, StoreError>;

    async fn mark_all_read(&self, user_id: u64) -> Result<u64, StoreError>;
}
