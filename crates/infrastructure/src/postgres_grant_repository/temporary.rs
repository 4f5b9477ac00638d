use super::*;

impl PostgresGrantRepository {
    pub(super) async fn list_active_temporary_grants_impl(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<TemporaryGrant>> {
        let rows = sqlx::query_as::<_, TemporaryGrantRow>(
            r#"
            SELECT
                id, user_id, region, expires_at, granted_by, reason,
                created_at, revoked_at, revoked_by, revoke_reason
            FROM temporary_region_grants
            WHERE user_id = $1
              AND revoked_at IS NULL
              AND expires_at > $2
            ORDER BY region, expires_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list active temporary grants: {error}"))
        })?;

        rows.into_iter().map(TemporaryGrant::try_from).collect()
    }

    pub(super) async fn create_temporary_grant_impl(
        &self,
        user_id: UserId,
        draft: &TemporaryGrantDraft,
        granted_by: &str,
    ) -> AppResult<TemporaryGrant> {
        let row = sqlx::query_as::<_, TemporaryGrantRow>(
            r#"
            INSERT INTO temporary_region_grants (user_id, region, expires_at, granted_by, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                id, user_id, region, expires_at, granted_by, reason,
                created_at, revoked_at, revoked_by, revoke_reason
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(draft.region().as_str())
        .bind(draft.expires_at())
        .bind(granted_by)
        .bind(draft.reason())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                AppError::NotFound(format!("user '{user_id}' does not exist"))
            } else {
                AppError::Internal(format!("failed to create temporary region grant: {error}"))
            }
        })?;

        TemporaryGrant::try_from(row)
    }

    pub(super) async fn extend_temporary_grant_impl(
        &self,
        grant_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<TemporaryGrant>> {
        let row = sqlx::query_as::<_, TemporaryGrantRow>(
            r#"
            UPDATE temporary_region_grants
            SET expires_at = $2
            WHERE id = $1
              AND revoked_at IS NULL
            RETURNING
                id, user_id, region, expires_at, granted_by, reason,
                created_at, revoked_at, revoked_by, revoke_reason
            "#,
        )
        .bind(grant_id)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to extend temporary region grant: {error}"))
        })?;

        row.map(TemporaryGrant::try_from).transpose()
    }

    pub(super) async fn revoke_temporary_grant_impl(
        &self,
        grant_id: Uuid,
        revoked_by: &str,
        reason: Option<&str>,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<TemporaryGrant>> {
        let row = sqlx::query_as::<_, TemporaryGrantRow>(
            r#"
            UPDATE temporary_region_grants
            SET revoked_at = $4,
                revoked_by = $2,
                revoke_reason = $3
            WHERE id = $1
              AND revoked_at IS NULL
            RETURNING
                id, user_id, region, expires_at, granted_by, reason,
                created_at, revoked_at, revoked_by, revoke_reason
            "#,
        )
        .bind(grant_id)
        .bind(revoked_by)
        .bind(reason)
        .bind(revoked_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to revoke temporary region grant: {error}"))
        })?;

        row.map(TemporaryGrant::try_from).transpose()
    }

    pub(super) async fn list_temporary_grants_impl(
        &self,
        query: TemporaryGrantQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<TemporaryGrant>> {
        let (limit, offset) = page(query.limit, query.offset);
        let rows = sqlx::query_as::<_, TemporaryGrantRow>(
            r#"
            SELECT
                id, user_id, region, expires_at, granted_by, reason,
                created_at, revoked_at, revoked_by, revoke_reason
            FROM temporary_region_grants
            WHERE ($1::UUID IS NULL OR user_id = $1)
              AND (
                  $2::BOOLEAN = false
                  OR (revoked_at IS NULL AND expires_at > $3)
              )
            ORDER BY created_at DESC
            LIMIT $4
            OFFSET $5
            "#,
        )
        .bind(query.user_id.map(|user_id| user_id.as_uuid()))
        .bind(query.active_only)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list temporary region grants: {error}"))
        })?;

        rows.into_iter().map(TemporaryGrant::try_from).collect()
    }
}
