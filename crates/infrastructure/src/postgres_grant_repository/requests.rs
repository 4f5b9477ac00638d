use super::*;

use sqlx::PgExecutor;

pub(super) async fn fetch_access_request<'e, E>(
    executor: E,
    request_id: Uuid,
) -> AppResult<Option<AccessRequest>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, AccessRequestRow>(
        r#"
        SELECT
            requests.id,
            requests.user_id,
            requests.reason,
            requests.status,
            requests.reviewed_by,
            requests.review_notes,
            requests.reviewed_at,
            requests.created_at,
            COALESCE(
                array_agg(regions.region ORDER BY regions.region)
                    FILTER (WHERE regions.region IS NOT NULL),
                '{}'
            ) AS regions
        FROM access_requests AS requests
        LEFT JOIN access_request_regions AS regions
            ON regions.request_id = requests.id
        WHERE requests.id = $1
        GROUP BY requests.id
        "#,
    )
    .bind(request_id)
    .fetch_optional(executor)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load access request: {error}")))?;

    row.map(AccessRequest::try_from).transpose()
}

impl PostgresGrantRepository {
    pub(super) async fn create_access_request_impl(
        &self,
        user_id: UserId,
        draft: &AccessRequestDraft,
    ) -> AppResult<AccessRequest> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let (request_id, created_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO access_requests (user_id, reason)
            VALUES ($1, $2)
            RETURNING id, created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(draft.reason())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                AppError::NotFound(format!("user '{user_id}' does not exist"))
            } else {
                AppError::Internal(format!("failed to create access request: {error}"))
            }
        })?;

        for region in draft.regions() {
            sqlx::query(
                r#"
                INSERT INTO access_request_regions (request_id, region)
                VALUES ($1, $2)
                ON CONFLICT (request_id, region) DO NOTHING
                "#,
            )
            .bind(request_id)
            .bind(region.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to persist access request regions: {error}"))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(AccessRequest {
            request_id,
            user_id,
            regions: draft.regions().to_vec(),
            reason: draft.reason().to_owned(),
            status: AccessRequestStatus::Pending,
            reviewed_by: None,
            review_notes: None,
            reviewed_at: None,
            created_at,
        })
    }

    pub(super) async fn list_access_requests_impl(
        &self,
        query: AccessRequestQuery,
    ) -> AppResult<Vec<AccessRequest>> {
        let (limit, offset) = page(query.limit, query.offset);
        let rows = sqlx::query_as::<_, AccessRequestRow>(
            r#"
            SELECT
                requests.id,
                requests.user_id,
                requests.reason,
                requests.status,
                requests.reviewed_by,
                requests.review_notes,
                requests.reviewed_at,
                requests.created_at,
                COALESCE(
                    array_agg(regions.region ORDER BY regions.region)
                        FILTER (WHERE regions.region IS NOT NULL),
                    '{}'
                ) AS regions
            FROM access_requests AS requests
            LEFT JOIN access_request_regions AS regions
                ON regions.request_id = requests.id
            WHERE ($1::UUID IS NULL OR requests.user_id = $1)
              AND ($2::TEXT IS NULL OR requests.status = $2)
            GROUP BY requests.id
            ORDER BY requests.created_at DESC
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(query.user_id.map(|user_id| user_id.as_uuid()))
        .bind(query.status.map(|status| status.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list access requests: {error}")))?;

        rows.into_iter().map(AccessRequest::try_from).collect()
    }

    pub(super) async fn approve_access_request_impl(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<ApprovedAccessRequest>> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let approved = sqlx::query_as::<_, (Uuid,)>(
            r#"
            UPDATE access_requests
            SET status = 'approved',
                reviewed_by = $2,
                review_notes = $3,
                reviewed_at = $4
            WHERE id = $1
              AND status = 'pending'
            RETURNING user_id
            "#,
        )
        .bind(request_id)
        .bind(review.reviewed_by.as_str())
        .bind(review.notes.as_deref())
        .bind(review.reviewed_at)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to approve access request: {error}")))?;

        let Some((user_id,)) = approved else {
            return Ok(None);
        };

        let created_rows = sqlx::query_as::<_, PermanentGrantRow>(
            r#"
            INSERT INTO region_grants (user_id, region, granted_by, granted_at)
            SELECT $2, region, $3, $4
            FROM access_request_regions
            WHERE request_id = $1
            ON CONFLICT (user_id, region) DO NOTHING
            RETURNING user_id, region, granted_by, granted_at
            "#,
        )
        .bind(request_id)
        .bind(user_id)
        .bind(review.reviewed_by.as_str())
        .bind(review.reviewed_at)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to create grants for approved request: {error}"))
        })?;

        let request = fetch_access_request(&mut *transaction, request_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "approved access request '{request_id}' disappeared before commit"
                ))
            })?;

        let mut created_grants = created_rows
            .into_iter()
            .map(RegionGrant::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        created_grants.sort_by(|left, right| left.region.cmp(&right.region));

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(Some(ApprovedAccessRequest {
            request,
            created_grants,
        }))
    }

    pub(super) async fn reject_access_request_impl(
        &self,
        request_id: Uuid,
        review: RequestReview,
    ) -> AppResult<Option<AccessRequest>> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE access_requests
            SET status = 'rejected',
                reviewed_by = $2,
                review_notes = $3,
                reviewed_at = $4
            WHERE id = $1
              AND status = 'pending'
            "#,
        )
        .bind(request_id)
        .bind(review.reviewed_by.as_str())
        .bind(review.notes.as_deref())
        .bind(review.reviewed_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to reject access request: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Ok(None);
        }

        fetch_access_request(&self.pool, request_id).await
    }

    pub(super) async fn cancel_access_request_impl(
        &self,
        request_id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> AppResult<Option<AccessRequest>> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE access_requests
            SET status = 'cancelled',
                reviewed_at = $2
            WHERE id = $1
              AND status = 'pending'
            "#,
        )
        .bind(request_id)
        .bind(cancelled_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to cancel access request: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Ok(None);
        }

        fetch_access_request(&self.pool, request_id).await
    }
}
