//! Best-effort audit trail for seller mutations.

use retrohub_core::audit::change_details;
use retrohub_core::types::DbId;
use retrohub_db::models::audit::CreateAuditLog;
use retrohub_db::repositories::AuditLogRepo;
use serde::Serialize;
use sqlx::PgPool;

/// Snapshot an entity for the `details_json` payload.
pub fn snapshot<T: Serialize>(entity: &T) -> Option<serde_json::Value> {
    serde_json::to_value(entity).ok()
}

/// Append an audit entry for a committed mutation.
///
/// Runs after the mutation is committed. A failed write is logged and
/// swallowed; the mutation stands.
pub async fn record_change(
    pool: &PgPool,
    actor: DbId,
    action_type: &'static str,
    entity_type: &'static str,
    entity_id: DbId,
    old: Option<serde_json::Value>,
    new: Option<serde_json::Value>,
) {
    let entry = CreateAuditLog {
        user_id: Some(actor),
        action_type: action_type.to_string(),
        entity_type: Some(entity_type.to_string()),
        entity_id: Some(entity_id),
        details_json: Some(change_details(old, new)),
    };

    if let Err(e) = AuditLogRepo::record(pool, &entry).await {
        tracing::warn!(
            error = %e,
            actor,
            action_type,
            entity_type,
            entity_id,
            "Failed to record audit log entry",
        );
    }
}
