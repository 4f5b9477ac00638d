use std::sync::Arc;

use chrono::{DateTime, Utc};
use regiongate_core::UserIdentity;
use regiongate_domain::{AccessBasis, AccessDecision, AuditAction, DenyReason, RegionName};
use tracing::{debug, warn};

use crate::{AuditEvent, AuditRepository, GrantStoreService};

#[cfg(test)]
mod tests;

/// Decides whether a caller may operate on a region.
///
/// Every decision is recorded in the audit log; the evaluator fails closed when
/// grants cannot be loaded or an allow decision cannot be recorded.
#[derive(Clone)]
pub struct AccessEvaluator {
    grant_store: GrantStoreService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AccessEvaluator {
    /// Creates a new evaluator.
    #[must_use]
    pub fn new(grant_store: GrantStoreService, audit_repository: Arc<dyn AuditRepository>) -> Self {
        Self {
            grant_store,
            audit_repository,
        }
    }

    /// Evaluates access to `region` for `actor` at `now`.
    pub async fn evaluate(
        &self,
        actor: &UserIdentity,
        region: &RegionName,
        now: DateTime<Utc>,
    ) -> AccessDecision {
        let decision = self.decide(actor, region, now).await;
        let recorded = self.record(actor, region, &decision).await;

        match (decision, recorded) {
            (AccessDecision::Allow(_), false) => {
                AccessDecision::Deny(DenyReason::StoreUnavailable)
            }
            (decision, _) => decision,
        }
    }

    async fn decide(
        &self,
        actor: &UserIdentity,
        region: &RegionName,
        now: DateTime<Utc>,
    ) -> AccessDecision {
        if actor.role().has_region_override() {
            return AccessDecision::Allow(AccessBasis::Administrative);
        }

        match self.grant_store.effective_regions(actor.user_id(), now).await {
            Ok(effective) => AccessDecision::from_effective_regions(region, &effective),
            Err(error) => {
                warn!(
                    user_id = %actor.user_id(),
                    region = %region,
                    error = %error,
                    "failed to load region grants, denying access"
                );
                AccessDecision::Deny(DenyReason::StoreUnavailable)
            }
        }
    }

    async fn record(
        &self,
        actor: &UserIdentity,
        region: &RegionName,
        decision: &AccessDecision,
    ) -> bool {
        let action = if decision.is_allowed() {
            AuditAction::AccessAllowed
        } else {
            AuditAction::AccessDenied
        };

        let event = AuditEvent {
            subject: actor.subject(),
            action,
            resource_type: "region".to_owned(),
            resource_id: region.to_string(),
            detail: Some(decision.message(region)),
        };

        match self.audit_repository.append_event(event).await {
            Ok(()) => {
                debug!(
                    user_id = %actor.user_id(),
                    region = %region,
                    allowed = decision.is_allowed(),
                    temporary = decision.is_temporary(),
                    "recorded access decision"
                );
                true
            }
            Err(error) => {
                warn!(
                    user_id = %actor.user_id(),
                    region = %region,
                    allowed = decision.is_allowed(),
                    error = %error,
                    "failed to record access decision"
                );
                false
            }
        }
    }
}
