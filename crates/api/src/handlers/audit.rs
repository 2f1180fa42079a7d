//! Handlers for the audit trail.

use axum::extract::{Query, State};
use axum::Json;
use retrohub_db::models::audit::{AuditLogPage, AuditQuery};
use retrohub_db::repositories::AuditLogRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/audit-logs
///
/// Filter by `user_id`, `action_type`, `entity_type`, `entity_id`; newest first.
/// `limit` defaults to 50 and is capped at 500.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<DataResponse<AuditLogPage>>> {
    let items = AuditLogRepo::query(&state.pool, &params).await?;
    let total = AuditLogRepo::count(&state.pool, &params).await?;
    Ok(Json(DataResponse {
        data: AuditLogPage { items, total },
    }))
}
