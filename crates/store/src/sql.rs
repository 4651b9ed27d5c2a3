//! Bind sea-query builders to rusqlite and translate errors.

use chrono::{DateTime, Utc};
use famshare_api::db::Built;
use famshare_api::{Role, ServiceError};
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

/// Convert `sea_query::Values` into rusqlite bind params.
pub(crate) fn bind_values(values: &sea_query::Values) -> Vec<SqlValue> {
    values
        .0
        .iter()
        .map(|v| match v {
            sea_query::Value::Bool(Some(b)) => SqlValue::Integer(i64::from(*b)),
            sea_query::Value::TinyInt(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::SmallInt(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::Int(Some(i)) => SqlValue::Integer(i64::from(*i)),
            sea_query::Value::BigInt(Some(i)) => SqlValue::Integer(*i),
            sea_query::Value::Double(Some(f)) => SqlValue::Real(*f),
            sea_query::Value::String(Some(s)) => SqlValue::Text(s.to_string()),
            _ => SqlValue::Null,
        })
        .collect()
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
                && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

/// Fetch at most one row.
pub(crate) fn query_opt<T, F>(
    conn: &Connection,
    built: Built,
    context: &str,
    f: F,
) -> Result<Option<T>, ServiceError>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    conn.query_row(&sql, params_from_iter(bind_values(&values)), f)
        .optional()
        .map_err(ServiceError::from_db(context))
}

/// Fetch every row.
pub(crate) fn query_all<T, F>(
    conn: &Connection,
    built: Built,
    context: &str,
    f: F,
) -> Result<Vec<T>, ServiceError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = built;
    let mut stmt = conn.prepare(&sql).map_err(ServiceError::from_db(context))?;
    let rows = stmt
        .query_map(params_from_iter(bind_values(&values)), f)
        .map_err(ServiceError::from_db(context))?
        .collect::<rusqlite::Result<Vec<T>>>();
    rows.map_err(ServiceError::from_db(context))
}

/// Run a `COUNT(*)` query.
pub(crate) fn count(conn: &Connection, built: Built, context: &str) -> Result<i64, ServiceError> {
    let (sql, values) = built;
    conn.query_row(&sql, params_from_iter(bind_values(&values)), |row| row.get(0))
        .map_err(ServiceError::from_db(context))
}

/// Execute a statement and return the affected row count.
pub(crate) fn execute(
    conn: &Connection,
    built: Built,
    context: &str,
) -> Result<usize, ServiceError> {
    let (sql, values) = built;
    conn.execute(&sql, params_from_iter(bind_values(&values)))
        .map_err(ServiceError::from_db(context))
}

/// Execute an INSERT/UPDATE whose uniqueness violations are a client
/// `Conflict` rather than a server fault.
pub(crate) fn execute_unique(
    conn: &Connection,
    built: Built,
    context: &str,
    conflict: &str,
) -> Result<usize, ServiceError> {
    let (sql, values) = built;
    match conn.execute(&sql, params_from_iter(bind_values(&values))) {
        Ok(n) => Ok(n),
        Err(e) if is_unique_violation(&e) => Err(ServiceError::Conflict(conflict.to_string())),
        Err(e) => Err(ServiceError::from_db(context)(e)),
    }
}

// ── Column decoding ────────────────────────────────────────────────────────

pub(crate) fn role_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Role> {
    let raw: String = row.get(idx)?;
    raw.parse::<Role>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn instant_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}
