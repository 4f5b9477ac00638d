use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Query, State};
use regiongate_application::AuditLogQuery;
use regiongate_core::UserIdentity;
use regiongate_domain::AuditAction;

use crate::dto::{AuditLogEntryResponse, AuditPurgeResultResponse, PurgeAuditLogRequest};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct AuditLogListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub action: Option<String>,
    pub subject: Option<String>,
}

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AuditLogListQuery>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let action = query
        .action
        .as_deref()
        .map(AuditAction::from_str)
        .transpose()?;

    let entries = state
        .grant_store_service
        .list_audit_log(
            &user,
            AuditLogQuery {
                limit: query.limit.unwrap_or(50),
                offset: query.offset.unwrap_or(0),
                action,
                subject: query.subject,
            },
        )
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn purge_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<PurgeAuditLogRequest>,
) -> ApiResult<Json<AuditPurgeResultResponse>> {
    let result = state
        .grant_store_service
        .purge_audit_log(&user, payload.older_than_days)
        .await?;

    Ok(Json(AuditPurgeResultResponse::from(result)))
}
