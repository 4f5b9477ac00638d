use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use regiongate_application::{
    AccessRequestQuery, ApprovedAccessRequest, GrantRepository, RequestReview, TemporaryGrantQuery,
    UserDirectory,
};
use regiongate_core::{AppError, AppResult, UserId};
use regiongate_domain::{
    AccessRequest, AccessRequestDraft, AccessRequestStatus, RegionGrant, RegionName,
    TemporaryGrant, TemporaryGrantDraft,
};


#[derive(Debug, Default)]
struct GrantTables {
    permanent: BTreeMap<(UserId, RegionName), RegionGrant>,
    temporary: HashMap<Uuid, TemporaryGrant>,
    requests: HashMap<Uuid, AccessRequest>,
}

impl GrantTables {
    fn insert_permanent(
        &mut self,
        user_id: UserId,
        region: &RegionName,
        granted_by: &str,
        granted_at: DateTime<Utc>,
    ) -> Option<RegionGrant> {
        let key = (user_id, region.clone());
        if self.permanent.contains_key(&key) {
            return None;
        }

        let grant = RegionGrant {
            user_id,
            region: region.clone(),
            granted_by: granted_by.to_owned(),
            granted_at,
        };
        self.permanent.insert(key, grant.clone());
        Some(grant)
    }

    fn close_pending(
        &mut self,
        request_id: Uuid,
        status: AccessRequestStatus,
        review: Option<RequestReview>,
        closed_at: DateTime<Utc>,
    ) -> Option<AccessRequest> {
        let request = self
            .requests
            .get_mut(&request_id)
            .filter(|request| request.status.can_transition_to(status))?;

        request.status = status;
        request.reviewed_at = Some(closed_at);
        if let Some(review) = review {
            request.reviewed_by = Some(review.reviewed_by);
            request.review_notes = review.notes;
        }

        Some(request.clone())
    }
}

fn page<T>(values: Vec<T>, limit: usize, offset: usize) -> Vec<T> {
    values
        .into_iter()
        .skip(offset.min(5_000))
        .take(limit.clamp(1, 200))
        .collect()
}

/// In-memory grant repository.
///
/// All tables live behind one lock, so every mutation is atomic.
#[derive(Default)]
pub struct InMemoryGrantRepository {
    tables: RwLock<GrantTables>,
    users: Option<Arc<dyn UserDirectory>>,
}

impl InMemoryGrantRepository {
    /// Creates an empty in-memory repository that accepts any user id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository that rejects grants and requests for
    /// users missing from `users`, like the Postgres foreign keys do.
    #[must_use]
    pub fn with_user_directory(users: Arc<dyn UserDirectory>) -> Self {
        Self {
            tables: RwLock::default(),
            users: Some(users),
        }
    }

    async fn ensure_user_exists(&self, user_id: UserId) -> AppResult<()> {
        let Some(users) = &self.users else {
            return Ok(());
        };

        if users.find_identity(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl GrantRepository for InMemoryGrantRepository {
    async fn list_permanent_grants(&self, user_id: UserId) -> AppResult<Vec<RegionGrant>> {
        Ok(self
            .tables
            .read()
            .await
            .permanent
            .values()
            .filter(|grant| grant.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_active_temporary_grants(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<TemporaryGrant>> {
        Ok(self
            .tables
            .read()
            .await
            .temporary
            .values()
            .filter(|grant| grant.user_id == user_id && grant.is_active(now))
            .cloned()
            .collect())
    }

    async fn insert_permanent_grants(
        &self,
        user_id: UserId,
        regions: &[RegionName],
        granted_by: &str,
    ) -> AppResult<Vec<RegionGrant>> {
        self.ensure_user_exists(user_id).await?;
        let mut tables = self.tables.write().await;
        let granted_at = Utc::now();

        Ok(regions
            .iter()
            .filter_map(|region| tables.insert_permanent(user_id, region, granted_by, granted_at))
            .collect())
    }

    async fn delete_permanent_grant(
        &self,
        user_id: UserId,
        region: &RegionName,
    ) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .permanent
            .remove(&(user_id, region.clone()))
            .is_some())
    }

    async fn create_temporary_grant(
        &self,
        user_id: UserId,
        draft: &TemporaryGrantDraft,
        granted_by: &str,
    ) -> AppResult<TemporaryGrant> {
        self.ensure_user_exists(user_id).await?;
        let grant = TemporaryGrant {
            grant_id: Uuid::new_v4(),
            user_id,
            region: draft.region().clone(),
            expires_at: draft.expires_at(),
            granted_by: granted_by.to_owned(),
            reason: draft.reason().to_owned(),
            created_at: Utc::now(),
            revoked_at: None,
            revoked_by: None,
            revoke_reason: None,
        };

        self.tables
            .write()
            .await
            .temporary
            .insert(grant.grant_id, grant.clone());

        Ok(grant)
    }

    async fn extend_temporary_grant(
        &self,
        grant_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<TemporaryGrant>> {
        let mut tables = self.tables.write().await;

        Ok(tables
            .temporary
            .get_mut(&grant_id)
            .filter(|grant| !grant.is_revoked())
            .map(|grant| {
                grant.expires_at = expires_at;
                grant.clone()
            }))
    }

    async fn revoke_temporary_grant(
        &self,
        grant_id: Uuid,
        revoked_by: &str,
        reason: Option<&str>,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<TemporaryGrant>> {
        let mut tables = self.tables.write().await;

        Ok(tables
            .temporary
            .get_mut(&grant_id)
            .filter(|grant| !grant.is_revoked())
            .map(|grant| {
                grant.revoked_at = Some(revoked_at);
                grant.revoked_by = Some(revoked_by.to_owned());
                grant.revoke_reason = reason.map(str::to_owned);
                grant.clone()
            }))
    }

    async fn list_temporary_grants(
        &self,
        query: TemporaryGrantQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<TemporaryGrant>> {
        let tables = self.tables.read().await;
        let mut grants: Vec<TemporaryGrant> = tables
            .temporary
            .values()
            .filter(|grant| query.user_id.is_none_or(|user_id| grant.user_id == user_id))
            .filter(|grant| !query.active_only || grant.is_active(now))
            .cloned()
            .collect();
        grants.sort_by(|left, right| right.created_at.cmp(&left.created_at));

        Ok(page(grants, query.limit, query.offset))
    }

    async fn create_access_request(
        &self,
        user_id: UserId,
        draft: &AccessRequestDraft,
    ) -> AppResult<AccessRequest> {
        self.ensure_user_exists(user_id).await?;
        let request = AccessRequest {
            request_id: Uuid::new_v4(),
            user_id,
            regions: draft.regions().to_vec(),
            reason: draft.reason().to_owned(),
            status: AccessRequestStatus::Pending,
            reviewed_by: None,
            review_notes: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };

        self.tables
            .write()
            .await
            .requests
            .insert(request.request_id, request.clone());

        Ok(request)
    }

    async fn find_access_request(&self, request_id: Uuid) -> AppResult<Option<AccessRequest>> {
        Ok(self.tables.read().await.requests.get(&request_id).cloned())
    }

    async fn list_access_requests(
        &self,
        query: AccessRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<AccessRequest> = tables
            .requests
            .values()
            .filter(|request| query.user_id.is_none_or(|user_id| request.user_id == user_id))
            .filter(|request| query.status.is_none_or(|status| request.status == status))
            .cloned()
            .collect();
        requests.sort_by(|left, right| right.created_at.cmp(&left.created_at));

        Ok(page(requests, query.limit, query.offset))
    }

    async fn approve_access_request(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<ApprovedAccessRequest>> {
        let mut tables = self.tables.write().await;
        let Some(pending) = tables
            .requests
            .get(&request_id)
            .filter(|request| request.is_pending())
            .cloned()
        else {
            return Ok(None);
        };

        let reviewed_at = review.reviewed_at;
        let reviewed_by = review.reviewed_by.clone();
        let created_grants = pending
            .regions
            .iter()
            .filter_map(|region| {
                tables.insert_permanent(pending.user_id, region, &reviewed_by, reviewed_at)
            })
            .collect();

        Ok(tables
            .close_pending(
                request_id,
                AccessRequestStatus::Approved,
                Some(review),
                reviewed_at,
            )
            .map(|request| ApprovedAccessRequest {
                request,
                created_grants,
            }))
    }

    async fn reject_access_request(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<AccessRequest>> {
        let reviewed_at = review.reviewed_at;
        Ok(self.tables.write().await.close_pending(
            request_id,
            AccessRequestStatus::Rejected,
            Some(review),
            reviewed_at,
        ))
    }

    async fn cancel_access_request(
        &self,
        request_id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> AppResult<Option<AccessRequest>> {
        Ok(self.tables.write().await.close_pending(
            request_id,
            AccessRequestStatus::Cancelled,
            None,
            cancelled_at,
        ))
    }
}
