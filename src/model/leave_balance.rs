use serde::Serialize;
use utoipa::ToSchema;

use super::academic_year::AcademicYear;
use super::days::LeaveDays;
use super::leave_request::LeaveType;

/// Per (user, leave type, academic year) counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveBalance {
    pub user_id: u64,
    pub leave_type: LeaveType,
    pub academic_year: AcademicYear,
    pub opening: LeaveDays,
    pub used: LeaveDays,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    #[error("insufficient {leave_type} balance: {available} day(s) available, {requested} requested")]
    Insufficient {
        leave_type: LeaveType,
        available: LeaveDays,
        requested: LeaveDays,
    },
    #[error("{leave_type} usage counter overflowed")]
    Overflow { leave_type: LeaveType },
}

impl LeaveBalance {
    /// Row returned for a type nobody has seeded yet.
    pub fn unseeded(user_id: u64, leave_type: LeaveType, academic_year: AcademicYear) -> Self {
        Self {
            user_id,
            leave_type,
            academic_year,
            opening: LeaveDays::ZERO,
            used: LeaveDays::ZERO,
        }
    }

    /// `opening - used` for quota-bound types. OD has no allocation, so zero.
    pub fn available(&self) -> LeaveDays {
        if self.leave_type.is_quota_bound() {
            self.opening.saturating_sub(self.used)
        } else {
            LeaveDays::ZERO
        }
    }

    /// Returns the balance after consuming `delta`. Quota-bound types may not
    /// exceed their opening allocation.
    pub fn apply_usage(&self, delta: LeaveDays) -> Result<LeaveBalance, BalanceError> {
        let used = self.used.checked_add(delta).ok_or(BalanceError::Overflow {
            leave_type: self.leave_type,
        })?;
        if self.leave_type.is_quota_bound() && used > self.opening {
            return Err(BalanceError::Insufficient {
                leave_type: self.leave_type,
                available: self.available(),
                requested: delta,
            });
        }
        Ok(LeaveBalance {
            used,
            ..self.clone()
        })
    }

    /// One row per leave type, filling gaps with zeroed rows.
    pub fn complete_set(
        user_id: u64,
        academic_year: AcademicYear,
        rows: Vec<LeaveBalance>,
    ) -> Vec<LeaveBalance> {
        LeaveType::ALL
            .iter()
            .map(|leave_type| {
                rows.iter()
                    .find(|row| row.leave_type == *leave_type)
                    .cloned()
                    .unwrap_or_else(|| LeaveBalance::unseeded(user_id, *leave_type, academic_year))
            })
            .collect()
    }
}

/// Wire shape of a balance row, including the derived `available` counter.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "leave_type": "casual",
    "label": "Casual Leave",
    "academic_year": "2025-26",
    "opening": 12.0,
    "used": 4.0,
    "available": 8.0
}))]
pub struct BalanceView {
    pub leave_type: LeaveType,
    #[schema(value_type = String)]
    pub label: &'static str,
    #[schema(value_type = String)]
    pub academic_year: AcademicYear,
    #[schema(value_type = f64)]
    pub opening: LeaveDays,
    #[schema(value_type = f64)]
    pub used: LeaveDays,
    #[schema(value_type = f64)]
    pub available: LeaveDays,
}

impl From<&LeaveBalance> for BalanceView {
    fn from(balance: &LeaveBalance) -> Self {
        Self {
            leave_type: balance.leave_type,
            label: balance.leave_type.label(),
            academic_year: balance.academic_year,
            opening: balance.opening,
            used: balance.used,
            available: balance.available(),
        }
    }
}
