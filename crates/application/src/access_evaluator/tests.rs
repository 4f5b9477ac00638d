use std::sync::Arc;

use chrono::{Duration, Utc};
use regiongate_core::UserRole;
use regiongate_domain::{AccessBasis, AccessDecision, AuditAction, DenyReason};

use crate::GrantStoreService;
use crate::test_fakes::{
    FakeAuditLogRepository, FakeAuditRepository, FakeGrantRepository, identity, region,
};

use super::AccessEvaluator;

fn evaluator() -> (
    AccessEvaluator,
    Arc<FakeGrantRepository>,
    Arc<FakeAuditRepository>,
) {
    let grants = Arc::new(FakeGrantRepository::default());
    let audit = Arc::new(FakeAuditRepository::default());
    let grant_store = GrantStoreService::new(
        grants.clone(),
        audit.clone(),
        Arc::new(FakeAuditLogRepository::default()),
    );

    (
        AccessEvaluator::new(grant_store, audit.clone()),
        grants,
        audit,
    )
}

#[tokio::test]
async fn permanent_grant_allows_without_temporary_flag() {
    let (evaluator, grants, audit) = evaluator();
    let actor = identity(UserRole::Technician);
    let bystander = identity(UserRole::Technician);
    grants.seed_permanent(actor.user_id(), "Delhi").await;
    grants.seed_permanent(bystander.user_id(), "Goa").await;

    let decision = evaluator.evaluate(&actor, &region("Delhi"), Utc::now()).await;

    assert_eq!(decision, AccessDecision::Allow(AccessBasis::Permanent));
    assert!(!decision.is_temporary());
    assert_eq!(audit.actions().await, vec![AuditAction::AccessAllowed]);
}

#[tokio::test]
async fn temporary_grant_allows_only_before_expiry() {
    let (evaluator, grants, _) = evaluator();
    let actor = identity(UserRole::User);
    let now = Utc::now();
    grants
        .seed_temporary(actor.user_id(), "Delhi", now - Duration::seconds(1))
        .await;

    let expired = evaluator.evaluate(&actor, &region("Delhi"), now).await;
    assert!(!expired.is_allowed());

    grants
        .seed_temporary(actor.user_id(), "Delhi", now + Duration::hours(1))
        .await;

    let active = evaluator.evaluate(&actor, &region("Delhi"), now).await;
    assert!(active.is_allowed());
    assert!(active.is_temporary());
}

#[tokio::test]
async fn permanent_grant_wins_over_expired_temporary() {
    let (evaluator, grants, _) = evaluator();
    let actor = identity(UserRole::Technician);
    let now = Utc::now();
    grants.seed_permanent(actor.user_id(), "Punjab").await;
    grants
        .seed_temporary(actor.user_id(), "Punjab", now - Duration::minutes(10))
        .await;

    let decision = evaluator.evaluate(&actor, &region("Punjab"), now).await;

    assert!(decision.is_allowed());
    assert!(!decision.is_temporary());
}

#[tokio::test]
async fn deny_lists_effective_regions_and_is_audited() {
    let (evaluator, grants, audit) = evaluator();
    let actor = identity(UserRole::Technician);
    grants.seed_permanent(actor.user_id(), "Maharashtra").await;

    let decision = evaluator.evaluate(&actor, &region("Delhi"), Utc::now()).await;

    assert_eq!(
        decision,
        AccessDecision::Deny(DenyReason::NotGranted {
            effective_regions: vec![region("Maharashtra")],
        })
    );
    let events = audit.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::AccessDenied);
    assert_eq!(events[0].resource_id, "Delhi");
}

#[tokio::test]
async fn admin_override_skips_store_lookup() {
    let (evaluator, grants, _) = evaluator();
    grants.fail_reads(true);

    let decision = evaluator
        .evaluate(&identity(UserRole::Admin), &region("Kerala"), Utc::now())
        .await;

    assert_eq!(decision, AccessDecision::Allow(AccessBasis::Administrative));
}

#[tokio::test]
async fn store_failure_fails_closed() {
    let (evaluator, grants, audit) = evaluator();
    let actor = identity(UserRole::Manager);
    grants.seed_permanent(actor.user_id(), "Delhi").await;
    grants.fail_reads(true);

    let decision = evaluator.evaluate(&actor, &region("Delhi"), Utc::now()).await;

    assert_eq!(decision, AccessDecision::Deny(DenyReason::StoreUnavailable));
    assert_eq!(audit.actions().await, vec![AuditAction::AccessDenied]);
}

#[tokio::test]
async fn unrecorded_allow_is_downgraded_to_deny() {
    let (evaluator, grants, audit) = evaluator();
    let actor = identity(UserRole::Technician);
    grants.seed_permanent(actor.user_id(), "Delhi").await;
    audit.fail(true);

    let decision = evaluator.evaluate(&actor, &region("Delhi"), Utc::now()).await;

    assert_eq!(decision, AccessDecision::Deny(DenyReason::StoreUnavailable));
}

#[tokio::test]
async fn maharashtra_with_short_delhi_grant_loses_delhi_after_expiry() {
    let (evaluator, grants, _) = evaluator();
    let actor = identity(UserRole::Technician);
    let now = Utc::now();
    grants.seed_permanent(actor.user_id(), "Maharashtra").await;
    grants
        .seed_temporary(actor.user_id(), "Delhi", now + Duration::minutes(2))
        .await;

    let during = evaluator.evaluate(&actor, &region("Delhi"), now).await;
    assert!(during.is_temporary());

    let after = evaluator
        .evaluate(&actor, &region("Delhi"), now + Duration::minutes(3))
        .await;
    assert!(!after.is_allowed());
    assert!(
        after
            .message(&region("Delhi"))
            .ends_with("your regions are Maharashtra")
    );
}
