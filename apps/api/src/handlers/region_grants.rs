use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use regiongate_application::TemporaryGrantQuery;
use regiongate_core::{AppError, UserIdentity};
use uuid::Uuid;

use crate::dto::{
    AssignPermanentRegionsRequest, CreateTemporaryGrantRequest, ExtendTemporaryGrantRequest,
    RegionGrantResponse, RevokePermanentRegionRequest, RevokeTemporaryGrantRequest,
    TemporaryGrantResponse, parse_timestamp, parse_user_id,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermanentGrantListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryGrantListQuery {
    pub user_id: Option<String>,
    pub active_only: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn assign_permanent_regions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<AssignPermanentRegionsRequest>,
) -> ApiResult<(StatusCode, Json<Vec<RegionGrantResponse>>)> {
    let user_id = parse_user_id("userId", payload.user_id.as_str())?;
    let grants = state
        .grant_store_service
        .assign_regions(&user, user_id, payload.regions)
        .await?
        .into_iter()
        .map(RegionGrantResponse::from)
        .collect();

    Ok((StatusCode::CREATED, Json(grants)))
}

pub async fn revoke_permanent_region_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RevokePermanentRegionRequest>,
) -> ApiResult<StatusCode> {
    let user_id = parse_user_id("userId", payload.user_id.as_str())?;
    state
        .grant_store_service
        .revoke_permanent(&user, user_id, payload.region.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_permanent_grants_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<PermanentGrantListQuery>,
) -> ApiResult<Json<Vec<RegionGrantResponse>>> {
    let user_id = match query.user_id.as_deref() {
        Some(value) => parse_user_id("userId", value)?,
        None => user.user_id(),
    };

    let grants = state
        .grant_store_service
        .list_permanent_grants(&user, user_id)
        .await?
        .into_iter()
        .map(RegionGrantResponse::from)
        .collect();

    Ok(Json(grants))
}

pub async fn create_temporary_grant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateTemporaryGrantRequest>,
) -> ApiResult<(StatusCode, Json<TemporaryGrantResponse>)> {
    let user_id = parse_user_id("userId", payload.user_id.as_str())?;
    let expires_at = parse_timestamp("expiresAt", payload.expires_at.as_str())?;

    let grant = state
        .grant_store_service
        .grant_temporary(
            &user,
            user_id,
            payload.region.as_str(),
            expires_at,
            payload.reason.as_str(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TemporaryGrantResponse::from(grant)),
    ))
}

pub async fn list_temporary_grants_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<TemporaryGrantListQuery>,
) -> ApiResult<Json<Vec<TemporaryGrantResponse>>> {
    let user_id = query
        .user_id
        .as_deref()
        .map(|value| parse_user_id("userId", value))
        .transpose()?;

    let grants = state
        .grant_store_service
        .list_temporary_grants(
            &user,
            TemporaryGrantQuery {
                user_id,
                active_only: query.active_only.unwrap_or(false),
                limit: query.limit.unwrap_or(50),
                offset: query.offset.unwrap_or(0),
            },
        )
        .await?
        .into_iter()
        .map(TemporaryGrantResponse::from)
        .collect();

    Ok(Json(grants))
}

pub async fn extend_temporary_grant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(grant_id): Path<Uuid>,
    Json(payload): Json<ExtendTemporaryGrantRequest>,
) -> ApiResult<Json<TemporaryGrantResponse>> {
    let expires_at = parse_timestamp("expiresAt", payload.expires_at.as_str())?;
    let grant = state
        .grant_store_service
        .extend_temporary(&user, grant_id, expires_at)
        .await?;

    Ok(Json(TemporaryGrantResponse::from(grant)))
}

pub async fn revoke_temporary_grant_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(grant_id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    // The body is optional for this route.
    let payload = if body.is_empty() {
        RevokeTemporaryGrantRequest::default()
    } else {
        serde_json::from_slice::<RevokeTemporaryGrantRequest>(&body).map_err(|error| {
            AppError::Validation(format!("invalid revoke payload: {error}"))
        })?
    };

    state
        .grant_store_service
        .revoke_temporary(&user, grant_id, payload.reason.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
