use regiongate_application::{AuditLogEntry, AuditPurgeResult};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for audit purges.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/purge-audit-log-request.ts"
)]
pub struct PurgeAuditLogRequest {
    pub older_than_days: u16,
}

/// API representation of an audit log entry.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub subject: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
    pub created_at: String,
}

/// API representation of an audit purge.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/audit-purge-result-response.ts"
)]
pub struct AuditPurgeResultResponse {
    #[ts(type = "number")]
    pub deleted_count: u64,
    pub older_than_days: u16,
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            subject: value.subject,
            action: value.action,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            detail: value.detail,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

impl From<AuditPurgeResult> for AuditPurgeResultResponse {
    fn from(value: AuditPurgeResult) -> Self {
        Self {
            deleted_count: value.deleted_count,
            older_than_days: value.older_than_days,
        }
    }
}
