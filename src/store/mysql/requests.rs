use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use tracing::{debug, error};

use super::{MySqlStore, balances, is_lock_contention, now, parse_column};
use crate::model::{LeaveDays, LeaveRequest, NewLeaveRequest};
use crate::store::{Page, Paged, RequestFilter, RequestStore, StatusChange, StoreError};

const SELECT_REQUEST: &str = r#"
    SELECT id, user_id, leave_type, from_date, to_date, number_of_days, reason, status,
           is_half_day, assigned_faculty, approved_by, department_id, version,
           created_at, updated_at
    FROM leave_requests
"#;

#[derive(FromRow)]
struct LeaveRequestRow {
    id: u64,
    user_id: u64,
    leave_type: String,
    from_date: NaiveDate,
    to_date: NaiveDate,
    number_of_days: f64,
    reason: String,
    status: String,
    is_half_day: bool,
    assigned_faculty: Option<u64>,
    approved_by: Option<u64>,
    department_id: Option<u64>,
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveRequestRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRequestRow) -> Result<Self, Self::Error> {
        let number_of_days = LeaveDays::from_f64(row.number_of_days).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "leave_requests.number_of_days has unexpected value {}",
                row.number_of_days
            ))
        })?;
        Ok(LeaveRequest {
            id: row.id,
            requester_id: row.user_id,
            leave_type: parse_column("leave_requests.leave_type", &row.leave_type)?,
            from_date: row.from_date,
            to_date: row.to_date,
            number_of_days,
            reason: row.reason,
            status: parse_column("leave_requests.status", &row.status)?,
            is_half_day: row.is_half_day,
            assigned_faculty: row.assigned_faculty,
            approved_by: row.approved_by,
            department_id: row.department_id,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(&'static str),
}

fn where_clause(filter: RequestFilter) -> (&'static str, Vec<FilterValue>) {
    match filter {
        RequestFilter::Requester(user_id) => (" WHERE user_id = ?", vec![FilterValue::U64(user_id)]),
        RequestFilter::Department(department_id) => (
            " WHERE department_id = ?",
            vec![FilterValue::U64(department_id)],
        ),
        RequestFilter::Institution => ("", Vec::new()),
        RequestFilter::ForwardedOrOd => (
            " WHERE (status = ? OR leave_type = ?)",
            vec![FilterValue::Str("forwarded"), FilterValue::Str("od")],
        ),
    }
}

impl MySqlStore {
    async fn apply_transition(&self, change: StatusChange) -> Result<LeaveRequest, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the request serializes competing approvers.
        let sql = format!("{SELECT_REQUEST} WHERE id = ? FOR UPDATE");
        let current: LeaveRequest = sqlx::query_as::<_, LeaveRequestRow>(&sql)
            .bind(change.request_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound(change.request_id))?
            .try_into()?;

        if current.version != change.expected_version {
            debug!(
                request_id = change.request_id,
                expected = change.expected_version,
                found = current.version,
                "Stale leave request version"
            );
            return Err(StoreError::Conflict(change.request_id));
        }

        if let Some(charge) = &change.charge {
            balances::charge(&mut tx, charge).await?;
        }

        let updated_at = now();
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approved_by = ?, version = version + 1, updated_at = ?
            WHERE id = ?
            AND version = ?
            "#,
        )
        .bind(change.new_status.as_ref())
        .bind(change.approved_by)
        .bind(updated_at)
        .bind(change.request_id)
        .bind(change.expected_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(change.request_id));
        }

        tx.commit().await?;

        Ok(LeaveRequest {
            status: change.new_status,
            approved_by: Some(change.approved_by),
            version: current.version + 1,
            updated_at,
            ..current
        })
    }
}

#[async_trait]
impl RequestStore for MySqlStore {
    async fn insert_request(&self, new: NewLeaveRequest) -> Result<LeaveRequest, StoreError> {
        let created_at = now();
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (user_id, leave_type, from_date, to_date, number_of_days, reason, status,
                 is_half_day, assigned_faculty, department_id, version, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(new.requester_id)
        .bind(new.leave_type.as_ref())
        .bind(new.from_date)
        .bind(new.to_date)
        .bind(new.number_of_days.as_f64())
        .bind(&new.reason)
        .bind(new.is_half_day)
        .bind(new.assigned_faculty)
        .bind(new.department_id)
        .bind(created_at)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, requester_id = new.requester_id, "Failed to insert leave request");
            StoreError::from(e)
        })?;

        Ok(new.into_request(result.last_insert_id(), created_at))
    }

    async fn fetch_request(&self, id: u64) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("{SELECT_REQUEST} WHERE id = ?");
        sqlx::query_as::<_, LeaveRequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(LeaveRequest::try_from)
            .transpose()
    }

    async fn commit_transition(&self, change: StatusChange) -> Result<LeaveRequest, StoreError> {
        let request_id = change.request_id;
        self.apply_transition(change).await.map_err(|e| match e {
            StoreError::Database(db) if is_lock_contention(&db) => {
                debug!(request_id, error = %db, "Lock contention on leave transition");
                StoreError::Conflict(request_id)
            }
            other => other,
        })
    }

    async fn list_requests(
        &self,
        filter: RequestFilter,
        page: Page,
    ) -> Result<Paged<LeaveRequest>, StoreError> {
        let (where_sql, args) = where_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(*s),
            };
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(|e| {
            error!(error = %e, ?filter, "Failed to count leave requests");
            StoreError::from(e)
        })?;

        let data_sql = format!(
            "{SELECT_REQUEST}{where_sql} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let mut data_q = sqlx::query_as::<_, LeaveRequestRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }
        let rows = data_q
            .bind(u64::from(page.per_page))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, ?filter, "Failed to fetch leave list");
                StoreError::from(e)
            })?;

        let data = rows
            .into_iter()
            .map(LeaveRequest::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paged {
            data,
            page,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}
