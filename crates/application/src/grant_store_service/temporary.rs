use super::*;

use regiongate_domain::{TemporaryGrant, TemporaryGrantDraft, validate_future_expiry};
use uuid::Uuid;

use crate::TemporaryGrantQuery;

impl GrantStoreService {
    /// Grants time-bounded access to one region.
    pub async fn grant_temporary(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        region: &str,
        expires_at: DateTime<Utc>,
        reason: &str,
    ) -> AppResult<TemporaryGrant> {
        self.require_capability(actor, Capability::ManageGrants, &user_id.to_string())
            .await?;

        let draft = TemporaryGrantDraft::new(region, expires_at, reason, Utc::now())?;
        let grant = self
            .repository
            .create_temporary_grant(user_id, &draft, &actor.subject())
            .await?;

        self.append_audit(
            actor,
            AuditAction::RegionTemporaryGranted,
            "temporary_region_grant",
            grant.grant_id.to_string(),
            format!(
                "granted temporary access to '{}' for user '{}' until '{}'",
                grant.region,
                grant.user_id,
                grant.expires_at.to_rfc3339()
            ),
        )
        .await?;

        Ok(grant)
    }

    /// Moves the expiry of an unrevoked temporary grant.
    pub async fn extend_temporary(
        &self,
        actor: &UserIdentity,
        grant_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<TemporaryGrant> {
        self.require_capability(actor, Capability::ManageGrants, &grant_id.to_string())
            .await?;

        validate_future_expiry(expires_at, Utc::now())?;

        let grant = self
            .repository
            .extend_temporary_grant(grant_id, expires_at)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "temporary grant '{grant_id}' does not exist or is revoked"
                ))
            })?;

        self.append_audit(
            actor,
            AuditAction::RegionTemporaryExtended,
            "temporary_region_grant",
            grant_id.to_string(),
            format!(
                "extended temporary access to '{}' until '{}'",
                grant.region,
                grant.expires_at.to_rfc3339()
            ),
        )
        .await?;

        Ok(grant)
    }

    /// Revokes an unrevoked temporary grant.
    pub async fn revoke_temporary(
        &self,
        actor: &UserIdentity,
        grant_id: Uuid,
        reason: Option<&str>,
    ) -> AppResult<()> {
        self.require_capability(actor, Capability::ManageGrants, &grant_id.to_string())
            .await?;

        let reason = reason.map(str::trim).filter(|value| !value.is_empty());
        let grant = self
            .repository
            .revoke_temporary_grant(grant_id, &actor.subject(), reason, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "temporary grant '{grant_id}' does not exist or is already revoked"
                ))
            })?;

        self.append_audit(
            actor,
            AuditAction::RegionTemporaryRevoked,
            "temporary_region_grant",
            grant_id.to_string(),
            reason
                .map(|reason| format!("revoked temporary access to '{}': {reason}", grant.region))
                .unwrap_or_else(|| format!("revoked temporary access to '{}'", grant.region)),
        )
        .await
    }

    /// Lists temporary grants.
    ///
    /// Callers without grant management only see their own grants.
    pub async fn list_temporary_grants(
        &self,
        actor: &UserIdentity,
        mut query: TemporaryGrantQuery,
    ) -> AppResult<Vec<TemporaryGrant>> {
        if !actor.role().can_manage_grants() {
            query.user_id = Some(actor.user_id());
        }

        self.repository
            .list_temporary_grants(query, Utc::now())
            .await
    }
}
