//! PostgreSQL-backed region grant and access request repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use regiongate_application::{
    AccessRequestQuery, ApprovedAccessRequest, GrantRepository, RequestReview, TemporaryGrantQuery,
};
use regiongate_core::{AppError, AppResult, UserId};
use regiongate_domain::{
    AccessRequest, AccessRequestDraft, AccessRequestStatus, RegionGrant, RegionName,
    TemporaryGrant, TemporaryGrantDraft,
};

mod permanent;
mod requests;
mod temporary;


/// PostgreSQL implementation of the grant repository port.
#[derive(Clone)]
pub struct PostgresGrantRepository {
    pool: PgPool,
}

impl PostgresGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermanentGrantRow {
    user_id: Uuid,
    region: String,
    granted_by: String,
    granted_at: DateTime<Utc>,
}

impl TryFrom<PermanentGrantRow> for RegionGrant {
    type Error = AppError;

    fn try_from(row: PermanentGrantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            region: stored_region(row.region)?,
            granted_by: row.granted_by,
            granted_at: row.granted_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TemporaryGrantRow {
    id: Uuid,
    user_id: Uuid,
    region: String,
    expires_at: DateTime<Utc>,
    granted_by: String,
    reason: String,
    created_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    revoked_by: Option<String>,
    revoke_reason: Option<String>,
}

impl TryFrom<TemporaryGrantRow> for TemporaryGrant {
    type Error = AppError;

    fn try_from(row: TemporaryGrantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            grant_id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            region: stored_region(row.region)?,
            expires_at: row.expires_at,
            granted_by: row.granted_by,
            reason: row.reason,
            created_at: row.created_at,
            revoked_at: row.revoked_at,
            revoked_by: row.revoked_by,
            revoke_reason: row.revoke_reason,
        })
    }
}

#[derive(Debug, FromRow)]
struct AccessRequestRow {
    id: Uuid,
    user_id: Uuid,
    reason: String,
    status: String,
    reviewed_by: Option<String>,
    review_notes: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    regions: Vec<String>,
}

impl TryFrom<AccessRequestRow> for AccessRequest {
    type Error = AppError;

    fn try_from(row: AccessRequestRow) -> Result<Self, Self::Error> {
        let status = AccessRequestStatus::from_str(row.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "stored access request '{}' has invalid status: {error}",
                row.id
            ))
        })?;

        Ok(Self {
            request_id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            regions: row
                .regions
                .into_iter()
                .map(stored_region)
                .collect::<AppResult<Vec<_>>>()?,
            reason: row.reason,
            status,
            reviewed_by: row.reviewed_by,
            review_notes: row.review_notes,
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
        })
    }
}

fn stored_region(value: String) -> AppResult<RegionName> {
    RegionName::new(value)
        .map_err(|error| AppError::Internal(format!("stored region is invalid: {error}")))
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23503")
    )
}

fn page(limit: usize, offset: usize) -> (i64, i64) {
    (limit.clamp(1, 200) as i64, offset.min(5_000) as i64)
}

#[async_trait]
impl GrantRepository for PostgresGrantRepository {
    async fn list_permanent_grants(&self, user_id: UserId) -> AppResult<Vec<RegionGrant>> {
        self.list_permanent_grants_impl(user_id).await
    }

    async fn list_active_temporary_grants(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<TemporaryGrant>> {
        self.list_active_temporary_grants_impl(user_id, now).await
    }

    async fn insert_permanent_grants(
        &self,
        user_id: UserId,
        regions: &[RegionName],
        granted_by: &str,
    ) -> AppResult<Vec<RegionGrant>> {
        self.insert_permanent_grants_impl(user_id, regions, granted_by)
            .await
    }

    async fn delete_permanent_grant(
        &self,
        user_id: UserId,
        region: &RegionName,
    ) -> AppResult<bool> {
        self.delete_permanent_grant_impl(user_id, region).await
    }

    async fn create_temporary_grant(
        &self,
        user_id: UserId,
        draft: &TemporaryGrantDraft,
        granted_by: &str,
    ) -> AppResult<TemporaryGrant> {
        self.create_temporary_grant_impl(user_id, draft, granted_by)
            .await
    }

    async fn extend_temporary_grant(
        &self,
        grant_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<TemporaryGrant>> {
        self.extend_temporary_grant_impl(grant_id, expires_at).await
    }

    async fn revoke_temporary_grant(
        &self,
        grant_id: Uuid,
        revoked_by: &str,
        reason: Option<&str>,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<TemporaryGrant>> {
        self.revoke_temporary_grant_impl(grant_id, revoked_by, reason, revoked_at)
            .await
    }

    async fn list_temporary_grants(
        &self,
        query: TemporaryGrantQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<TemporaryGrant>> {
        self.list_temporary_grants_impl(query, now).await
    }

    async fn create_access_request(
        &self,
        user_id: UserId,
        draft: &AccessRequestDraft,
    ) -> AppResult<AccessRequest> {
        self.create_access_request_impl(user_id, draft).await
    }

    async fn find_access_request(&self, request_id: Uuid) -> AppResult<Option<AccessRequest>> {
        requests::fetch_access_request(&self.pool, request_id).await
    }

    async fn list_access_requests(
        &self,
        query: AccessRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        self.list_access_requests_impl(query).await
    }

    async fn approve_access_request(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<ApprovedAccessRequest>> {
        self.approve_access_request_impl(request_id, review).await
    }

    async fn reject_access_request(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<AccessRequest>> {
        self.reject_access_request_impl(request_id, review).await
    }

    async fn cancel_access_request(
        &self,
        request_id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> AppResult<Option<AccessRequest>> {
        self.cancel_access_request_impl(request_id, cancelled_at)
            .await
    }
}
