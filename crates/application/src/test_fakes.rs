use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use regiongate_core::{AppError, AppResult, UserId, UserIdentity, UserRole};
use regiongate_domain::{
    AccessRequest, AccessRequestDraft, AccessRequestStatus, AuditAction, RegionGrant, RegionName,
    TemporaryGrant, TemporaryGrantDraft,
};

use crate::{
    AccessRequestQuery, ApprovedAccessRequest, AuditEvent, AuditLogEntry, AuditLogQuery,
    AuditLogRepository, AuditRepository, GrantRepository, RequestReview, TemporaryGrantQuery,
};

pub(crate) fn region(name: &str) -> RegionName {
    match RegionName::new(name) {
        Ok(region) => region,
        Err(error) => panic!("invalid fixture region '{name}': {error}"),
    }
}

pub(crate) fn identity(role: UserRole) -> UserIdentity {
    UserIdentity::new(UserId::new(), "Field User", None, role)
}

#[derive(Default)]
struct GrantState {
    permanent: Vec<RegionGrant>,
    temporary: Vec<TemporaryGrant>,
    requests: Vec<AccessRequest>,
}

#[derive(Default)]
pub(crate) struct FakeGrantRepository {
    state: Mutex<GrantState>,
    fail_reads: AtomicBool,
    fail_approval: AtomicBool,
}

impl FakeGrantRepository {
    pub(crate) async fn seed_permanent(&self, user_id: UserId, name: &str) {
        self.state.lock().await.permanent.push(RegionGrant {
            user_id,
            region: region(name),
            granted_by: "seed".to_owned(),
            granted_at: Utc::now(),
        });
    }

    pub(crate) async fn seed_temporary(
        &self,
        user_id: UserId,
        name: &str,
        expires_at: DateTime<Utc>,
    ) -> Uuid {
        let grant_id = Uuid::new_v4();
        self.state.lock().await.temporary.push(TemporaryGrant {
            grant_id,
            user_id,
            region: region(name),
            expires_at,
            granted_by: "seed".to_owned(),
            reason: "seeded grant".to_owned(),
            created_at: Utc::now(),
            revoked_at: None,
            revoked_by: None,
            revoke_reason: None,
        });
        grant_id
    }

    pub(crate) async fn permanent_regions(&self, user_id: UserId) -> Vec<String> {
        let mut regions: Vec<String> = self
            .state
            .lock()
            .await
            .permanent
            .iter()
            .filter(|grant| grant.user_id == user_id)
            .map(|grant| grant.region.to_string())
            .collect();
        regions.sort();
        regions
    }

    pub(crate) async fn request_status(&self, request_id: Uuid) -> Option<AccessRequestStatus> {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .find(|request| request.request_id == request_id)
            .map(|request| request.status)
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_approval(&self, fail: bool) {
        self.fail_approval.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> AppResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal("grant store unreachable".to_owned()));
        }

        Ok(())
    }
}

fn review_pending(
    state: &mut GrantState,
    request_id: Uuid,
    status: AccessRequestStatus,
    review: RequestReview,
) -> Option<AccessRequest> {
    let request = state
        .requests
        .iter_mut()
        .find(|request| request.request_id == request_id && request.is_pending())?;
    request.status = status;
    request.reviewed_by = Some(review.reviewed_by);
    request.review_notes = review.notes;
    request.reviewed_at = Some(review.reviewed_at);
    Some(request.clone())
}

#[async_trait]
impl GrantRepository for FakeGrantRepository {
    async fn list_permanent_grants(&self, user_id: UserId) -> AppResult<Vec<RegionGrant>> {
        self.check_reads()?;
        Ok(self
            .state
            .lock()
            .await
            .permanent
            .iter()
            .filter(|grant| grant.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_active_temporary_grants(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<TemporaryGrant>> {
        self.check_reads()?;
        Ok(self
            .state
            .lock()
            .await
            .temporary
            .iter()
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
        let mut state = self.state.lock().await;
        let mut created = Vec::new();
        for region in regions {
            let exists = state
                .permanent
                .iter()
                .any(|grant| grant.user_id == user_id && &grant.region == region);
            if exists {
                continue;
            }

            let grant = RegionGrant {
                user_id,
                region: region.clone(),
                granted_by: granted_by.to_owned(),
                granted_at: Utc::now(),
            };
            state.permanent.push(grant.clone());
            created.push(grant);
        }
        Ok(created)
    }

    async fn delete_permanent_grant(
        &self,
        user_id: UserId,
        region: &RegionName,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.permanent.len();
        state
            .permanent
            .retain(|grant| !(grant.user_id == user_id && &grant.region == region));
        Ok(state.permanent.len() != before)
    }

    async fn create_temporary_grant(
        &self,
        user_id: UserId,
        draft: &TemporaryGrantDraft,
        granted_by: &str,
    ) -> AppResult<TemporaryGrant> {
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
        self.state.lock().await.temporary.push(grant.clone());
        Ok(grant)
    }

    async fn extend_temporary_grant(
        &self,
        grant_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<TemporaryGrant>> {
        let mut state = self.state.lock().await;
        Ok(state
            .temporary
            .iter_mut()
            .find(|grant| grant.grant_id == grant_id && !grant.is_revoked())
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
        let mut state = self.state.lock().await;
        Ok(state
            .temporary
            .iter_mut()
            .find(|grant| grant.grant_id == grant_id && !grant.is_revoked())
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
        self.check_reads()?;
        Ok(self
            .state
            .lock()
            .await
            .temporary
            .iter()
            .filter(|grant| query.user_id.is_none_or(|user_id| grant.user_id == user_id))
            .filter(|grant| !query.active_only || grant.is_active(now))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn create_access_request(
        &self,
        user_id: UserId,
        draft: &AccessRequestDraft,
    ) -> AppResult<AccessRequest> {
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
        self.state.lock().await.requests.push(request.clone());
        Ok(request)
    }

    async fn find_access_request(&self, request_id: Uuid) -> AppResult<Option<AccessRequest>> {
        Ok(self
            .state
            .lock()
            .await
            .requests
            .iter()
            .find(|request| request.request_id == request_id)
            .cloned())
    }

    async fn list_access_requests(
        &self,
        query: AccessRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        Ok(self
            .state
            .lock()
            .await
            .requests
            .iter()
            .filter(|request| query.user_id.is_none_or(|user_id| request.user_id == user_id))
            .filter(|request| query.status.is_none_or(|status| request.status == status))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn approve_access_request(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<ApprovedAccessRequest>> {
        let mut state = self.state.lock().await;
        let Some(pending) = state
            .requests
            .iter()
            .find(|request| request.request_id == request_id && request.is_pending())
            .cloned()
        else {
            return Ok(None);
        };

        if self.fail_approval.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "failed to insert approved grants".to_owned(),
            ));
        }

        let granted_at = review.reviewed_at;
        let granted_by = review.reviewed_by.clone();
        let mut created_grants = Vec::new();
        for region in &pending.regions {
            let exists = state
                .permanent
                .iter()
                .any(|grant| grant.user_id == pending.user_id && &grant.region == region);
            if !exists {
                let grant = RegionGrant {
                    user_id: pending.user_id,
                    region: region.clone(),
                    granted_by: granted_by.clone(),
                    granted_at,
                };
                state.permanent.push(grant.clone());
                created_grants.push(grant);
            }
        }

        let request = review_pending(&mut state, request_id, AccessRequestStatus::Approved, review);
        Ok(request.map(|request| ApprovedAccessRequest {
            request,
            created_grants,
        }))
    }

    async fn reject_access_request(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<AccessRequest>> {
        let mut state = self.state.lock().await;
        Ok(review_pending(
            &mut state,
            request_id,
            AccessRequestStatus::Rejected,
            review,
        ))
    }

    async fn cancel_access_request(
        &self,
        request_id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> AppResult<Option<AccessRequest>> {
        let mut state = self.state.lock().await;
        Ok(state
            .requests
            .iter_mut()
            .find(|request| request.request_id == request_id && request.is_pending())
            .map(|request| {
                request.status = AccessRequestStatus::Cancelled;
                request.reviewed_at = Some(cancelled_at);
                request.clone()
            }))
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    events: Mutex<Vec<AuditEvent>>,
    fail: AtomicBool,
}

impl FakeAuditRepository {
    pub(crate) async fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().await.clone()
    }

    pub(crate) async fn actions(&self) -> Vec<AuditAction> {
        self.events
            .lock()
            .await
            .iter()
            .map(|event| event.action)
            .collect()
    }

    pub(crate) fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("audit log unavailable".to_owned()));
        }

        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditLogRepository {
    purged_before: Mutex<Vec<DateTime<Utc>>>,
}

impl FakeAuditLogRepository {
    pub(crate) async fn purge_cutoffs(&self) -> Vec<DateTime<Utc>> {
        self.purged_before.lock().await.clone()
    }
}

#[async_trait]
impl AuditLogRepository for FakeAuditLogRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(vec![AuditLogEntry {
            event_id: "1".to_owned(),
            subject: query.subject.unwrap_or_else(|| "admin".to_owned()),
            action: AuditAction::AccessAllowed.as_str().to_owned(),
            resource_type: "region".to_owned(),
            resource_id: "Delhi".to_owned(),
            detail: None,
            created_at: Utc::now(),
        }])
    }

    async fn purge_entries_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        self.purged_before.lock().await.push(cutoff);
        Ok(3)
    }
}
