use super::*;

use regiongate_domain::{AccessRequest, AccessRequestDraft, RegionName, normalize_review_notes};
use tracing::info;
use uuid::Uuid;

use crate::{AccessRequestQuery, ApprovedAccessRequest, RequestReview};

fn not_pending(request_id: Uuid) -> AppError {
    AppError::NotFound(format!(
        "access request '{request_id}' not found or not pending"
    ))
}

fn region_list(regions: &[RegionName]) -> String {
    regions
        .iter()
        .map(RegionName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl GrantStoreService {
    /// Files a pending access request for the acting user.
    pub async fn create_access_request(
        &self,
        actor: &UserIdentity,
        regions: Vec<String>,
        reason: &str,
    ) -> AppResult<AccessRequest> {
        let draft = AccessRequestDraft::new(regions, reason)?;
        let request = self
            .repository
            .create_access_request(actor.user_id(), &draft)
            .await?;

        self.append_audit(
            actor,
            AuditAction::AccessRequestCreated,
            "access_request",
            request.request_id.to_string(),
            format!("requested access to {}", region_list(&request.regions)),
        )
        .await?;

        Ok(request)
    }

    /// Approves a pending request, creating a permanent grant per requested region.
    pub async fn approve_access_request(
        &self,
        actor: &UserIdentity,
        request_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<ApprovedAccessRequest> {
        self.require_capability(actor, Capability::ManageGrants, &request_id.to_string())
            .await?;

        let review = RequestReview {
            reviewed_by: actor.subject(),
            notes: normalize_review_notes(notes)?,
            reviewed_at: Utc::now(),
        };

        let approved = self
            .repository
            .approve_access_request(request_id, review)
            .await?
            .ok_or_else(|| not_pending(request_id))?;

        self.append_audit(
            actor,
            AuditAction::AccessRequestApproved,
            "access_request",
            request_id.to_string(),
            format!(
                "approved access to {} for user '{}'",
                region_list(&approved.request.regions),
                approved.request.user_id
            ),
        )
        .await?;

        info!(
            request_id = %request_id,
            user_id = %approved.request.user_id,
            created_grants = approved.created_grants.len(),
            "approved access request"
        );

        Ok(approved)
    }

    /// Rejects a pending request.
    pub async fn reject_access_request(
        &self,
        actor: &UserIdentity,
        request_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<AccessRequest> {
        self.require_capability(actor, Capability::ManageGrants, &request_id.to_string())
            .await?;

        let review = RequestReview {
            reviewed_by: actor.subject(),
            notes: normalize_review_notes(notes)?,
            reviewed_at: Utc::now(),
        };

        let request = self
            .repository
            .reject_access_request(request_id, review)
            .await?
            .ok_or_else(|| not_pending(request_id))?;

        self.append_audit(
            actor,
            AuditAction::AccessRequestRejected,
            "access_request",
            request_id.to_string(),
            format!("rejected access request of user '{}'", request.user_id),
        )
        .await?;

        Ok(request)
    }

    /// Withdraws a pending request.
    ///
    /// The requester may cancel their own request; administrators may cancel any request.
    pub async fn cancel_access_request(
        &self,
        actor: &UserIdentity,
        request_id: Uuid,
    ) -> AppResult<AccessRequest> {
        let existing = self
            .repository
            .find_access_request(request_id)
            .await?
            .ok_or_else(|| not_pending(request_id))?;

        if existing.user_id != actor.user_id() {
            self.require_capability(
                actor,
                Capability::CancelAnyRequest,
                &request_id.to_string(),
            )
            .await?;
        }

        if !existing.is_pending() {
            return Err(not_pending(request_id));
        }

        let request = self
            .repository
            .cancel_access_request(request_id, Utc::now())
            .await?
            .ok_or_else(|| not_pending(request_id))?;

        self.append_audit(
            actor,
            AuditAction::AccessRequestCancelled,
            "access_request",
            request_id.to_string(),
            format!("cancelled access request of user '{}'", request.user_id),
        )
        .await?;

        Ok(request)
    }

    /// Lists access requests; non-reviewers only see their own.
    pub async fn list_access_requests(
        &self,
        actor: &UserIdentity,
        mut query: AccessRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        if !actor.role().can_manage_grants() {
            query.user_id = Some(actor.user_id());
        }

        self.repository.list_access_requests(query).await
    }
}
