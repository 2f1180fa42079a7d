//! Repository for the `audit_logs` table.

use sqlx::PgPool;

use crate::models::audit::{AuditLog, AuditQuery, CreateAuditLog};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, timestamp, user_id, action_type, entity_type, \
    entity_id, details_json, created_at";

/// Default and maximum page sizes for audit queries.
const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

// ---------------------------------------------------------------------------
// AuditLogRepo
// ---------------------------------------------------------------------------

/// Provides query and insert operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one audit log entry.
    pub async fn record(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs (user_id, action_type, entity_type, entity_id, details_json)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entry.user_id)
            .bind(&entry.action_type)
            .bind(&entry.entity_type)
            .bind(entry.entity_id)
            .bind(&entry.details_json)
            .fetch_one(pool)
            .await
    }

    /// Query audit logs with filtering and pagination, newest first.
    pub async fn query(pool: &PgPool, params: &AuditQuery) -> Result<Vec<AuditLog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_audit_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs {where_clause} \
             ORDER BY timestamp DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_audit_values(sqlx::query_as::<_, AuditLog>(&query), &bind_values);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count audit logs matching the given filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &AuditQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_audit_filter(params);

        let query = format!("SELECT COUNT(*)::BIGINT AS count FROM audit_logs {where_clause}");

        let q = bind_audit_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built audit log queries.
enum BindValue {
    BigInt(i64),
    Text(String),
}

/// Build a WHERE clause and bind values from `AuditQuery` filter parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
/// The `where_clause` is empty if no filters are active, or starts with `WHERE `.
fn build_audit_filter(params: &AuditQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(user_id) = params.user_id {
        conditions.push(format!("user_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(user_id));
    }

    if let Some(ref action_type) = params.action_type {
        conditions.push(format!("action_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(action_type.clone()));
    }

    if let Some(ref entity_type) = params.entity_type {
        conditions.push(format!("entity_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(entity_type.clone()));
    }

    if let Some(entity_id) = params.entity_id {
        conditions.push(format!("entity_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(entity_id));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_audit_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_audit_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
        }
    }
    q
}
