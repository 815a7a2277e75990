use async_trait::async_trait;
use sqlx::{FromRow, MySql, Transaction};
use tracing::debug;

use super::{MySqlStore, parse_column};
use crate::model::{AcademicYear, LeaveBalance, LeaveDays};
use crate::store::{BalanceLedger, StoreError, UsageCharge};

#[derive(FromRow)]
struct LeaveBalanceRow {
    user_id: u64,
    leave_type: String,
    academic_year: String,
    opening: f64,
    used: f64,
}

fn days(column: &str, value: f64) -> Result<LeaveDays, StoreError> {
    LeaveDays::from_f64(value)
        .ok_or_else(|| StoreError::Corrupt(format!("{column} has unexpected value {value}")))
}

impl TryFrom<LeaveBalanceRow> for LeaveBalance {
    type Error = StoreError;

    fn try_from(row: LeaveBalanceRow) -> Result<Self, Self::Error> {
        Ok(LeaveBalance {
            user_id: row.user_id,
            leave_type: parse_column("leave_balances.leave_type", &row.leave_type)?,
            academic_year: parse_column("leave_balances.academic_year", &row.academic_year)?,
            opening: days("leave_balances.opening", row.opening)?,
            used: days("leave_balances.used", row.used)?,
        })
    }
}

/// Applies an approval's usage inside the caller's transaction. The balance
/// row is seeded (opening 0) when missing and then locked, so concurrent
/// approvals for the same (user, type, year) lock an existing record
/// instead of racing on gap locks.
pub(super) async fn charge(
    tx: &mut Transaction<'_, MySql>,
    charge: &UsageCharge,
) -> Result<LeaveBalance, StoreError> {
    let academic_year = charge.academic_year.to_string();

    sqlx::query(
        r#"
        INSERT IGNORE INTO leave_balances (user_id, leave_type, academic_year, opening, used)
        VALUES (?, ?, ?, 0, 0)
        "#,
    )
    .bind(charge.user_id)
    .bind(charge.leave_type.as_ref())
    .bind(&academic_year)
    .execute(&mut **tx)
    .await?;

    let current: LeaveBalance = sqlx::query_as::<_, LeaveBalanceRow>(
        r#"
        SELECT user_id, leave_type, academic_year, opening, used
        FROM leave_balances
        WHERE user_id = ? AND leave_type = ? AND academic_year = ?
        FOR UPDATE
        "#,
    )
    .bind(charge.user_id)
    .bind(charge.leave_type.as_ref())
    .bind(&academic_year)
    .fetch_one(&mut **tx)
    .await?
    .try_into()?;

    let updated = current.apply_usage(charge.days)?;

    sqlx::query(
        r#"
        UPDATE leave_balances
        SET used = ?
        WHERE user_id = ? AND leave_type = ? AND academic_year = ?
        "#,
    )
    .bind(updated.used.as_f64())
    .bind(updated.user_id)
    .bind(updated.leave_type.as_ref())
    .bind(&academic_year)
    .execute(&mut **tx)
    .await?;

    debug!(
        user_id = updated.user_id,
        leave_type = %updated.leave_type,
        academic_year = %academic_year,
        used = %updated.used,
        "Leave balance charged"
    );

    Ok(updated)
}

#[async_trait]
impl BalanceLedger for MySqlStore {
    async fn balances(
        &self,
        user_id: u64,
        academic_year: AcademicYear,
    ) -> Result<Vec<LeaveBalance>, StoreError> {
        sqlx::query_as::<_, LeaveBalanceRow>(
            r#"
            SELECT user_id, leave_type, academic_year, opening, used
            FROM leave_balances
            WHERE user_id = ? AND academic_year = ?
            "#,
        )
        .bind(user_id)
        .bind(academic_year.to_string())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(LeaveBalance::try_from)
        .collect()
    }
}
