use chrono::{Duration, Utc};
use regiongate_application::{
    AuditEvent, AuditLogQuery, AuditLogRepository, AuditRepository,
};
use regiongate_domain::AuditAction;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresAuditLogRepository;
use crate::PostgresAuditRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres audit log tests: {error}");
    }

    Some(pool)
}

#[tokio::test]
async fn appended_events_are_listed_by_subject_and_action() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let audit_repository = PostgresAuditRepository::new(pool.clone());
    let repository = PostgresAuditLogRepository::new(pool);
    let subject = Uuid::new_v4().to_string();

    for action in [AuditAction::AccessAllowed, AuditAction::AccessDenied] {
        let appended = audit_repository
            .append_event(AuditEvent {
                subject: subject.clone(),
                action,
                resource_type: "region".to_owned(),
                resource_id: "Delhi".to_owned(),
                detail: None,
            })
            .await;
        assert!(appended.is_ok());
    }

    let denied = repository
        .list_recent_entries(AuditLogQuery {
            limit: 10,
            offset: 0,
            action: Some(AuditAction::AccessDenied),
            subject: Some(subject.clone()),
        })
        .await;
    assert!(matches!(denied, Ok(ref entries) if entries.len() == 1 && entries[0].action == "access.denied"));

    let all = repository
        .list_recent_entries(AuditLogQuery {
            limit: 10,
            offset: 0,
            action: None,
            subject: Some(subject),
        })
        .await;
    assert!(matches!(all, Ok(ref entries) if entries.len() == 2));
}

#[tokio::test]
async fn purge_removes_only_entries_older_than_cutoff() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAuditLogRepository::new(pool.clone());
    let subject = Uuid::new_v4().to_string();

    for (resource_id, age_days) in [("old", 45_i32), ("recent", 1_i32)] {
        let insert = sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                subject,
                action,
                resource_type,
                resource_id,
                created_at
            )
            VALUES ($1, 'access.allowed', 'region', $2, now() - make_interval(days => $3))
            "#,
        )
        .bind(subject.as_str())
        .bind(resource_id)
        .bind(age_days)
        .execute(&pool)
        .await;
        assert!(insert.is_ok());
    }

    let purged = repository
        .purge_entries_before(Utc::now() - Duration::days(30))
        .await;
    assert!(matches!(purged, Ok(count) if count >= 1));

    let remaining = repository
        .list_recent_entries(AuditLogQuery {
            limit: 10,
            offset: 0,
            action: None,
            subject: Some(subject),
        })
        .await;
    assert!(matches!(remaining, Ok(ref entries) if entries.len() == 1 && entries[0].resource_id == "recent"));
}
