use std::sync::Arc;

use chrono::{DateTime, Utc};
use regiongate_core::{AppError, AppResult, UserId, UserIdentity};
use regiongate_domain::{AuditAction, EffectiveRegions};
use tracing::warn;

use crate::{AuditEvent, AuditLogRepository, AuditRepository, GrantRepository};

mod audit_log;
mod permanent;
mod requests;
mod temporary;


/// Privileged capability checked at the store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capability {
    ManageGrants,
    CancelAnyRequest,
    ReadAuditLog,
    PurgeAuditLog,
}

impl Capability {
    fn is_granted_to(self, actor: &UserIdentity) -> bool {
        match self {
            Self::ManageGrants => actor.role().can_manage_grants(),
            Self::CancelAnyRequest => actor.role().can_cancel_any_request(),
            Self::ReadAuditLog => actor.role().can_read_audit_log(),
            Self::PurgeAuditLog => actor.role().can_purge_audit_log(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::ManageGrants => "region grant management",
            Self::CancelAnyRequest => "cancelling another user's access request",
            Self::ReadAuditLog => "audit log access",
            Self::PurgeAuditLog => "audit log purge",
        }
    }
}

/// Application service for region grants, access requests and audit history.
#[derive(Clone)]
pub struct GrantStoreService {
    repository: Arc<dyn GrantRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    audit_log_repository: Arc<dyn AuditLogRepository>,
}

impl GrantStoreService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn GrantRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        audit_log_repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            repository,
            audit_repository,
            audit_log_repository,
        }
    }

    /// Resolves the regions a user may work in at `now`.
    pub async fn effective_regions(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<EffectiveRegions> {
        let permanent = self.repository.list_permanent_grants(user_id).await?;
        let temporary = self
            .repository
            .list_active_temporary_grants(user_id, now)
            .await?;

        Ok(EffectiveRegions::resolve(
            user_id, &permanent, &temporary, now,
        ))
    }

    /// Resolves effective regions on behalf of a caller.
    ///
    /// Callers may read their own regions; reading another user's requires grant management.
    pub async fn effective_regions_for(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<EffectiveRegions> {
        if actor.user_id() != user_id {
            self.require_capability(actor, Capability::ManageGrants, &user_id.to_string())
                .await?;
        }

        self.effective_regions(user_id, now).await
    }

    async fn require_capability(
        &self,
        actor: &UserIdentity,
        capability: Capability,
        resource_id: &str,
    ) -> AppResult<()> {
        if capability.is_granted_to(actor) {
            return Ok(());
        }

        let denial = AuditEvent {
            subject: actor.subject(),
            action: AuditAction::AccessDenied,
            resource_type: "privileged_action".to_owned(),
            resource_id: resource_id.to_owned(),
            detail: Some(format!(
                "role '{}' may not perform {}",
                actor.role().as_str(),
                capability.label()
            )),
        };

        if let Err(error) = self.audit_repository.append_event(denial).await {
            warn!(
                subject = %actor.subject(),
                capability = capability.label(),
                error = %error,
                "failed to record refused privileged action"
            );
        }

        Err(AppError::Forbidden(format!(
            "role '{}' is not allowed to perform {}",
            actor.role().as_str(),
            capability.label()
        )))
    }

    async fn append_audit(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}
