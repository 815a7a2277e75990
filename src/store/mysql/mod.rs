mod balances;
mod directory;
mod notifications;
mod requests;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use moka::future::Cache;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlDatabaseError;

use super::StoreError;
use crate::model::Profile;

/// MySQL-backed implementation of every store port.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    /// user id -> directory profile
    profiles: Cache<u64, Profile>,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, profile_ttl: Duration) -> Self {
        let profiles = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(profile_ttl)
            .build();
        Self { pool, profiles }
    }
}

/// `TIMESTAMP(6)` keeps microseconds; truncate so values read back compare equal.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn parse_column<T: FromStr>(column: &str, raw: &str) -> Result<T, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Corrupt(format!("{column} has unexpected value {raw:?}")))
}

/// Deadlock (1213) or lock wait timeout (1205). MySQL has already rolled the
/// losing statement back, so the caller may re-read and retry.
fn is_lock_contention(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.try_downcast_ref::<MySqlDatabaseError>())
        .is_some_and(|db| is_contention_code(db.number()))
}

fn is_contention_code(number: u16) -> bool {
    matches!(number, 1205 | 1213)
}
