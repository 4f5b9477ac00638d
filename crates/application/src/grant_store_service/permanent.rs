use super::*;

use regiongate_domain::{RegionGrant, RegionName};
use tracing::info;

impl GrantStoreService {
    /// Grants one permanent region; conflicts when the grant already exists.
    pub async fn grant_permanent(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        region: &str,
    ) -> AppResult<RegionGrant> {
        self.require_capability(actor, Capability::ManageGrants, &user_id.to_string())
            .await?;

        let region = RegionName::new(region)?;
        let created = self
            .repository
            .insert_permanent_grants(user_id, std::slice::from_ref(&region), &actor.subject())
            .await?;

        let Some(grant) = created.into_iter().next() else {
            return Err(AppError::Conflict(format!(
                "user '{user_id}' already holds a permanent grant for '{region}'"
            )));
        };

        self.append_audit(
            actor,
            AuditAction::RegionPermanentGranted,
            "region_grant",
            format!("{user_id}:{region}"),
            format!("granted permanent access to '{region}' for user '{user_id}'"),
        )
        .await?;

        Ok(grant)
    }

    /// Grants several permanent regions in one transaction, keeping existing grants.
    ///
    /// Returns only the grants that were newly created.
    pub async fn assign_regions(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        regions: Vec<String>,
    ) -> AppResult<Vec<RegionGrant>> {
        self.require_capability(actor, Capability::ManageGrants, &user_id.to_string())
            .await?;

        let mut names = regions
            .into_iter()
            .map(RegionName::new)
            .collect::<AppResult<Vec<_>>>()?;
        names.sort();
        names.dedup();

        if names.is_empty() {
            return Err(AppError::Validation(
                "select at least one region to assign".to_owned(),
            ));
        }

        let created = self
            .repository
            .insert_permanent_grants(user_id, &names, &actor.subject())
            .await?;

        for grant in &created {
            self.append_audit(
                actor,
                AuditAction::RegionPermanentGranted,
                "region_grant",
                format!("{user_id}:{}", grant.region),
                format!(
                    "granted permanent access to '{}' for user '{user_id}'",
                    grant.region
                ),
            )
            .await?;
        }

        info!(
            user_id = %user_id,
            requested = names.len(),
            created = created.len(),
            "assigned permanent regions"
        );

        Ok(created)
    }

    /// Removes a permanent grant.
    pub async fn revoke_permanent(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        region: &str,
    ) -> AppResult<()> {
        self.require_capability(actor, Capability::ManageGrants, &user_id.to_string())
            .await?;

        let region = RegionName::new(region)?;
        let deleted = self
            .repository
            .delete_permanent_grant(user_id, &region)
            .await?;

        if !deleted {
            return Err(AppError::NotFound(format!(
                "permanent grant for user '{user_id}' in region '{region}' does not exist"
            )));
        }

        self.append_audit(
            actor,
            AuditAction::RegionPermanentRevoked,
            "region_grant",
            format!("{user_id}:{region}"),
            format!("revoked permanent access to '{region}' for user '{user_id}'"),
        )
        .await
    }

    /// Lists permanent grants of a user.
    pub async fn list_permanent_grants(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<RegionGrant>> {
        if actor.user_id() != user_id {
            self.require_capability(actor, Capability::ManageGrants, &user_id.to_string())
                .await?;
        }

        self.repository.list_permanent_grants(user_id).await
    }
}
