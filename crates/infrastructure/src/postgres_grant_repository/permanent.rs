use super::*;

impl PostgresGrantRepository {
    pub(super) async fn list_permanent_grants_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<RegionGrant>> {
        let rows = sqlx::query_as::<_, PermanentGrantRow>(
            r#"
            SELECT user_id, region, granted_by, granted_at
            FROM region_grants
            WHERE user_id = $1
            ORDER BY region
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permanent region grants: {error}"))
        })?;

        rows.into_iter().map(RegionGrant::try_from).collect()
    }

    pub(super) async fn insert_permanent_grants_impl(
        &self,
        user_id: UserId,
        regions: &[RegionName],
        granted_by: &str,
    ) -> AppResult<Vec<RegionGrant>> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let mut created = Vec::with_capacity(regions.len());
        for region in regions {
            let row = sqlx::query_as::<_, PermanentGrantRow>(
                r#"
                INSERT INTO region_grants (user_id, region, granted_by)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, region) DO NOTHING
                RETURNING user_id, region, granted_by, granted_at
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(region.as_str())
            .bind(granted_by)
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    AppError::NotFound(format!("user '{user_id}' does not exist"))
                } else {
                    AppError::Internal(format!("failed to insert permanent region grant: {error}"))
                }
            })?;

            if let Some(row) = row {
                created.push(RegionGrant::try_from(row)?);
            }
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(created)
    }

    pub(super) async fn delete_permanent_grant_impl(
        &self,
        user_id: UserId,
        region: &RegionName,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM region_grants
            WHERE user_id = $1
              AND region = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(region.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete permanent region grant: {error}"))
        })?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}
