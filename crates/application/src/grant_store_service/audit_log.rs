use super::*;

use chrono::Duration;
use tracing::info;

use crate::{AuditLogEntry, AuditLogQuery, AuditPurgeResult};

impl GrantStoreService {
    /// Lists recent audit entries for reviewers.
    pub async fn list_audit_log(
        &self,
        actor: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.require_capability(actor, Capability::ReadAuditLog, "audit_log")
            .await?;

        self.audit_log_repository.list_recent_entries(query).await
    }

    /// Deletes audit entries older than `older_than_days` and records the purge.
    pub async fn purge_audit_log(
        &self,
        actor: &UserIdentity,
        older_than_days: u16,
    ) -> AppResult<AuditPurgeResult> {
        self.require_capability(actor, Capability::PurgeAuditLog, "audit_log")
            .await?;

        if older_than_days == 0 {
            return Err(AppError::Validation(
                "olderThanDays must be greater than zero".to_owned(),
            ));
        }

        let cutoff = Utc::now() - Duration::days(i64::from(older_than_days));
        let deleted_count = self
            .audit_log_repository
            .purge_entries_before(cutoff)
            .await?;

        self.append_audit(
            actor,
            AuditAction::AuditLogPurged,
            "audit_log",
            "audit_log".to_owned(),
            format!("purged {deleted_count} entries older than {older_than_days} days"),
        )
        .await?;

        info!(
            subject = %actor.subject(),
            deleted_count,
            older_than_days,
            "purged audit log"
        );

        Ok(AuditPurgeResult {
            deleted_count,
            older_than_days,
        })
    }
}
