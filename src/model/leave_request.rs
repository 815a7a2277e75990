use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::days::LeaveDays;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
    Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Casual,
    Earned,
    Medical,
    /// On-duty: official work off-site, signed off by the Principal.
    Od,
}

impl LeaveType {
    pub const ALL: [LeaveType; 4] = [
        LeaveType::Casual,
        LeaveType::Earned,
        LeaveType::Medical,
        LeaveType::Od,
    ];

    /// Quota-bound types draw down an opening allocation; OD only counts usage.
    pub fn is_quota_bound(self) -> bool {
        !matches!(self, LeaveType::Od)
    }

    pub fn label(self) -> &'static str {
        match self {
            LeaveType::Casual => "Casual Leave",
            LeaveType::Earned => "Earned Leave",
            LeaveType::Medical => "Medical Leave",
            LeaveType::Od => "On-Duty (OD)",
        }
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Forwarded,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LeaveStatus::Approved | LeaveStatus::Rejected)
    }
}

/// A leave request as persisted. Never deleted; `version` increases by one on
/// every accepted transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub requester_id: u64,
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-15", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2026-01-16", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = 2.0, value_type = f64)]
    pub number_of_days: LeaveDays,
    #[schema(example = "Personal work")]
    pub reason: String,
    pub status: LeaveStatus,
    pub is_half_day: bool,
    /// Substitute-duty delegate
    #[schema(nullable = true)]
    pub assigned_faculty: Option<u64>,
    #[schema(nullable = true)]
    pub approved_by: Option<u64>,
    /// Requester's department at creation time
    #[schema(nullable = true)]
    pub department_id: Option<u64>,
    #[schema(example = 0)]
    pub version: u32,
    #[schema(example = "2026-01-10T09:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-10T09:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

/// Validated input for inserting a request in `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLeaveRequest {
    pub requester_id: u64,
    pub leave_type: LeaveType,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub number_of_days: LeaveDays,
    pub reason: String,
    pub is_half_day: bool,
    pub assigned_faculty: Option<u64>,
    pub department_id: Option<u64>,
}

impl NewLeaveRequest {
    pub fn into_request(self, id: u64, now: DateTime<Utc>) -> LeaveRequest {
        LeaveRequest {
            id,
            requester_id: self.requester_id,
            leave_type: self.leave_type,
            from_date: self.from_date,
            to_date: self.to_date,
            number_of_days: self.number_of_days,
            reason: self.reason,
            status: LeaveStatus::Pending,
            is_half_day: self.is_half_day,
            assigned_faculty: self.assigned_faculty,
            approved_by: None,
            department_id: self.department_id,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
