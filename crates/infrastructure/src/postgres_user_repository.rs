//! PostgreSQL-backed user directory.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use regiongate_application::UserDirectory;
use regiongate_core::{AppError, AppResult, UserId, UserIdentity, UserRole};

/// PostgreSQL implementation of the user directory port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an account and returns its identity.
    pub async fn create_user(
        &self,
        display_name: &str,
        email: Option<&str>,
        role: UserRole,
    ) -> AppResult<UserIdentity> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (display_name, email, role)
            VALUES ($1, $2, $3)
            RETURNING id, display_name, email, role
            "#,
        )
        .bind(display_name)
        .bind(email)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| match &error {
            sqlx::Error::Database(database_error)
                if database_error.code().as_deref() == Some("23505") =>
            {
                AppError::Conflict(format!(
                    "a user with email '{}' already exists",
                    email.unwrap_or_default()
                ))
            }
            _ => AppError::Internal(format!("failed to create user: {error}")),
        })?;

        UserIdentity::try_from(row)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    display_name: String,
    email: Option<String>,
    role: String,
}

impl TryFrom<UserRow> for UserIdentity {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = UserRole::from_str(row.role.as_str()).map_err(|error| {
            AppError::Internal(format!("user '{}' has invalid role: {error}", row.id))
        })?;

        Ok(Self::new(
            UserId::from_uuid(row.id),
            row.display_name,
            row.email,
            role,
        ))
    }
}

#[async_trait]
impl UserDirectory for PostgresUserRepository {
    async fn find_identity(&self, user_id: UserId) -> AppResult<Option<UserIdentity>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, email, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        row.map(UserIdentity::try_from).transpose()
    }
}
