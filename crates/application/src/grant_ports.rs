use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regiongate_core::{AppResult, UserId};
use regiongate_domain::{
    AccessRequest, AccessRequestDraft, AccessRequestStatus, RegionGrant, RegionName,
    TemporaryGrant, TemporaryGrantDraft,
};
use uuid::Uuid;

/// Query parameters for temporary grant listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryGrantQuery {
    /// Optional grantee filter.
    pub user_id: Option<UserId>,
    /// Restrict results to grants that are unrevoked and unexpired.
    pub active_only: bool,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

/// Query parameters for access request listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequestQuery {
    /// Optional requester filter.
    pub user_id: Option<UserId>,
    /// Optional status filter.
    pub status: Option<AccessRequestStatus>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

/// Reviewer decision metadata applied to a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestReview {
    /// Reviewer subject.
    pub reviewed_by: String,
    /// Normalized reviewer notes.
    pub notes: Option<String>,
    /// Review timestamp.
    pub reviewed_at: DateTime<Utc>,
}

/// Approved request together with the permanent grants it created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedAccessRequest {
    /// Request in its approved state.
    pub request: AccessRequest,
    /// Grants inserted by the approval; regions already granted are omitted.
    pub created_grants: Vec<RegionGrant>,
}

/// Repository port for region grants and access requests.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Lists permanent grants held by a user.
    async fn list_permanent_grants(&self, user_id: UserId) -> AppResult<Vec<RegionGrant>>;

    /// Lists temporary grants of a user that are active at `now`.
    async fn list_active_temporary_grants(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<TemporaryGrant>>;

    /// Inserts permanent grants in one transaction and returns the newly created ones.
    async fn insert_permanent_grants(
        &self,
        user_id: UserId,
        regions: &[RegionName],
        granted_by: &str,
    ) -> AppResult<Vec<RegionGrant>>;

    /// Deletes a permanent grant, returning whether a row existed.
    async fn delete_permanent_grant(&self, user_id: UserId, region: &RegionName)
    -> AppResult<bool>;

    /// Persists a temporary grant.
    async fn create_temporary_grant(
        &self,
        user_id: UserId,
        draft: &TemporaryGrantDraft,
        granted_by: &str,
    ) -> AppResult<TemporaryGrant>;

    /// Sets a new expiry on an unrevoked grant; `None` when missing or revoked.
    async fn extend_temporary_grant(
        &self,
        grant_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<TemporaryGrant>>;

    /// Revokes an unrevoked grant; `None` when missing or already revoked.
    async fn revoke_temporary_grant(
        &self,
        grant_id: Uuid,
        revoked_by: &str,
        reason: Option<&str>,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<TemporaryGrant>>;

    /// Lists temporary grants by query.
    async fn list_temporary_grants(
        &self,
        query: TemporaryGrantQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<TemporaryGrant>>;

    /// Persists a pending access request.
    async fn create_access_request(
        &self,
        user_id: UserId,
        draft: &AccessRequestDraft,
    ) -> AppResult<AccessRequest>;

    /// Finds one access request.
    async fn find_access_request(&self, request_id: Uuid) -> AppResult<Option<AccessRequest>>;

    /// Lists access requests by query, newest first.
    async fn list_access_requests(&self, query: AccessRequestQuery)
    -> AppResult<Vec<AccessRequest>>;

    /// Approves a pending request and creates its permanent grants atomically.
    ///
    /// Returns `None` without changing anything when the request is missing or not pending.
    async fn approve_access_request(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<ApprovedAccessRequest>>;

    /// Rejects a pending request; `None` when missing or not pending.
    async fn reject_access_request(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<AccessRequest>>;

    /// Cancels a pending request; `None` when missing or not pending.
    async fn cancel_access_request(
        &self,
        request_id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> AppResult<Option<AccessRequest>>;
}
