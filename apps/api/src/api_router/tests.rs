use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use regiongate_application::{AccessEvaluator, GrantStoreService};
use regiongate_core::{UserId, UserIdentity, UserRole};
use regiongate_infrastructure::{
    InMemoryAuditRepository, InMemoryGrantRepository, InMemoryUserDirectory,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::access_token::AccessTokenCodec;
use crate::state::AppState;

use super::build_router;

const SECRET: &str = "router-test-secret-with-enough-length";

struct TestApp {
    router: Router,
    tokens: AccessTokenCodec,
    admin: UserIdentity,
    manager: UserIdentity,
    technician: UserIdentity,
}

async fn test_app() -> TestApp {
    let audit_repository = Arc::new(InMemoryAuditRepository::new());
    let user_directory = Arc::new(InMemoryUserDirectory::new());
    let grant_repository = Arc::new(InMemoryGrantRepository::with_user_directory(
        user_directory.clone(),
    ));

    let admin = UserIdentity::new(UserId::new(), "Admin", None, UserRole::Admin);
    let manager = UserIdentity::new(UserId::new(), "Manager", None, UserRole::Manager);
    let technician = UserIdentity::new(
        UserId::new(),
        "Technician",
        Some("tech@example.com".to_owned()),
        UserRole::Technician,
    );
    for identity in [&admin, &manager, &technician] {
        user_directory.insert(identity.clone()).await;
    }

    let grant_store_service = GrantStoreService::new(
        grant_repository,
        audit_repository.clone(),
        audit_repository.clone(),
    );
    let access_evaluator = AccessEvaluator::new(grant_store_service.clone(), audit_repository);
    let tokens = AccessTokenCodec::new(SECRET);

    let state = AppState {
        grant_store_service,
        access_evaluator,
        user_directory,
        access_tokens: tokens.clone(),
    };
    let router = match build_router(state, "http://localhost:3000") {
        Ok(router) => router,
        Err(error) => panic!("router should build: {error}"),
    };

    TestApp {
        router,
        tokens,
        admin,
        manager,
        technician,
    }
}

impl TestApp {
    fn token_for(&self, user_id: UserId) -> String {
        match self.tokens.issue(user_id, Duration::minutes(10), Utc::now()) {
            Ok(token) => token,
            Err(error) => panic!("token should be issued: {error}"),
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        caller: Option<UserId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = caller {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", self.token_for(user_id)));
        }

        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        let Ok(request) = request else {
            panic!("request should build");
        };

        let Ok(response) = self.router.clone().oneshot(request).await else {
            panic!("router should respond");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("response body should be readable");
        };
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    async fn assign(&self, user: &UserIdentity, regions: &[&str]) {
        let (status, _) = self
            .send(
                "POST",
                "/region-grants/permanent",
                Some(self.manager.user_id()),
                Some(json!({ "userId": user.user_id().to_string(), "regions": regions })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn health_does_not_require_a_token() {
    let app = test_app().await;

    let (status, body) = app.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_known_bearer_token() {
    let app = test_app().await;

    let (missing, body) = app
        .send("GET", "/region-access/effective-regions", None, None)
        .await;
    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("unauthorized:"))
    );

    let (unknown, _) = app
        .send(
            "GET",
            "/region-access/effective-regions",
            Some(UserId::new()),
            None,
        )
        .await;
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn permanent_grant_allows_only_that_region() {
    let app = test_app().await;
    app.assign(&app.technician, &["Maharashtra"]).await;
    let caller = Some(app.technician.user_id());

    let (status, allowed) = app
        .send(
            "POST",
            "/region-access/evaluate",
            caller,
            Some(json!({ "region": "Maharashtra" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(allowed["allowed"], true);
    assert_eq!(allowed["temporary"], false);
    assert!(allowed.get("expiresAt").is_none());

    let (_, denied) = app
        .send(
            "POST",
            "/region-access/evaluate",
            caller,
            Some(json!({ "region": "Goa" })),
        )
        .await;
    assert_eq!(denied["allowed"], false);
    assert!(
        denied["message"]
            .as_str()
            .is_some_and(|message| message.contains("Maharashtra"))
    );
}

#[tokio::test]
async fn temporary_grant_is_reported_as_temporary() {
    let app = test_app().await;
    let expires_at = (Utc::now() + Duration::minutes(2)).to_rfc3339();

    let (status, grant) = app
        .send(
            "POST",
            "/region-grants/temporary",
            Some(app.manager.user_id()),
            Some(json!({
                "userId": app.technician.user_id().to_string(),
                "region": "Delhi",
                "expiresAt": expires_at,
                "reason": "storm response",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(grant["region"], "Delhi");

    let caller = Some(app.technician.user_id());
    let (_, decision) = app
        .send(
            "POST",
            "/region-access/evaluate",
            caller,
            Some(json!({ "region": "Delhi" })),
        )
        .await;
    assert_eq!(decision["allowed"], true);
    assert_eq!(decision["temporary"], true);
    assert!(decision["expiresAt"].is_string());

    let (status, effective) = app
        .send("GET", "/region-access/effective-regions", caller, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(effective["success"], true);
    assert_eq!(effective["regions"][0]["name"], "Delhi");
    assert_eq!(effective["regions"][0]["temporary"], true);
}

#[tokio::test]
async fn temporary_grant_with_past_expiry_is_a_bad_request() {
    let app = test_app().await;

    let (status, body) = app
        .send(
            "POST",
            "/region-grants/temporary",
            Some(app.manager.user_id()),
            Some(json!({
                "userId": app.technician.user_id().to_string(),
                "region": "Delhi",
                "expiresAt": (Utc::now() - Duration::seconds(1)).to_rfc3339(),
                "reason": "too late",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("validation error:"))
    );
}

#[tokio::test]
async fn technician_grant_attempt_is_forbidden_and_audited() {
    let app = test_app().await;

    let (status, _) = app
        .send(
            "POST",
            "/region-grants/temporary",
            Some(app.technician.user_id()),
            Some(json!({
                "userId": app.technician.user_id().to_string(),
                "region": "Delhi",
                "expiresAt": (Utc::now() + Duration::hours(1)).to_rfc3339(),
                "reason": "self service",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, entries) = app
        .send(
            "GET",
            "/audit-log?action=access.denied",
            Some(app.admin.user_id()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let subject = app.technician.subject();
    assert!(entries.as_array().is_some_and(|entries| {
        entries
            .iter()
            .any(|entry| entry["subject"].as_str() == Some(subject.as_str()))
    }));
}

#[tokio::test]
async fn approved_request_grants_regions_and_cannot_be_cancelled() {
    let app = test_app().await;
    let requester = Some(app.technician.user_id());

    let (status, created) = app
        .send(
            "POST",
            "/region-requests",
            requester,
            Some(json!({
                "regions": ["Delhi", "Punjab"],
                "reason": "northern rollout coverage",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    let Some(request_id) = created["requestId"].as_str().map(str::to_owned) else {
        panic!("created request should carry an id");
    };

    let (status, approved) = app
        .send(
            "PATCH",
            &format!("/region-requests/{request_id}/approve"),
            Some(app.manager.user_id()),
            Some(json!({ "reviewNotes": "approved for rollout" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, _) = app
        .send(
            "DELETE",
            &format!("/region-requests/{request_id}"),
            requester,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, effective) = app
        .send("GET", "/region-access/effective-regions", requester, None)
        .await;
    let names = effective["regions"]
        .as_array()
        .map(|regions| {
            regions
                .iter()
                .filter_map(|region| region["name"].as_str())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    assert_eq!(names, vec!["Delhi", "Punjab"]);
}

#[tokio::test]
async fn short_request_reason_is_rejected() {
    let app = test_app().await;

    let (status, _) = app
        .send(
            "POST",
            "/region-requests",
            Some(app.technician.user_id()),
            Some(json!({ "regions": ["Goa"], "reason": "please" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reading_another_users_regions_requires_grant_management() {
    let app = test_app().await;
    app.assign(&app.technician, &["Kerala"]).await;

    let (status, _) = app
        .send(
            "GET",
            &format!(
                "/region-access/effective-regions?userId={}",
                app.manager.user_id()
            ),
            Some(app.technician.user_id()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, effective) = app
        .send(
            "GET",
            &format!(
                "/region-access/effective-regions?userId={}",
                app.technician.user_id()
            ),
            Some(app.manager.user_id()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(effective["regions"][0]["name"], "Kerala");
}

#[tokio::test]
async fn temporary_grant_revocation_accepts_an_empty_body() {
    let app = test_app().await;

    let (_, grant) = app
        .send(
            "POST",
            "/region-grants/temporary",
            Some(app.manager.user_id()),
            Some(json!({
                "userId": app.technician.user_id().to_string(),
                "region": "Goa",
                "expiresAt": (Utc::now() + Duration::hours(1)).to_rfc3339(),
                "reason": "coastal survey",
            })),
        )
        .await;
    let Some(grant_id) = grant["grantId"].as_str().map(str::to_owned) else {
        panic!("created grant should carry an id");
    };
    let uri = format!("/region-grants/temporary/{grant_id}");

    let (first, _) = app
        .send("DELETE", &uri, Some(app.manager.user_id()), None)
        .await;
    assert_eq!(first, StatusCode::NO_CONTENT);

    let (second, _) = app
        .send(
            "DELETE",
            &uri,
            Some(app.manager.user_id()),
            Some(json!({ "reason": "again" })),
        )
        .await;
    assert_eq!(second, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audit_purge_is_admin_only_and_validated() {
    let app = test_app().await;

    let (forbidden, _) = app
        .send(
            "POST",
            "/audit-log/purge",
            Some(app.manager.user_id()),
            Some(json!({ "olderThanDays": 30 })),
        )
        .await;
    assert_eq!(forbidden, StatusCode::FORBIDDEN);

    let (invalid, _) = app
        .send(
            "POST",
            "/audit-log/purge",
            Some(app.admin.user_id()),
            Some(json!({ "olderThanDays": 0 })),
        )
        .await;
    assert_eq!(invalid, StatusCode::BAD_REQUEST);

    let (status, result) = app
        .send(
            "POST",
            "/audit-log/purge",
            Some(app.admin.user_id()),
            Some(json!({ "olderThanDays": 30 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["deletedCount"], 0);
    assert_eq!(result["olderThanDays"], 30);
}

#[tokio::test]
async fn granting_regions_to_unknown_user_is_not_found() {
    let app = test_app().await;

    let (status, body) = app
        .send(
            "POST",
            "/region-grants/permanent",
            Some(app.manager.user_id()),
            Some(json!({ "userId": UserId::new().to_string(), "regions": ["Goa"] })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap_or_default().contains("does not exist"));
}
