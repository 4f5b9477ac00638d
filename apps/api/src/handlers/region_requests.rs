use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use regiongate_application::AccessRequestQuery;
use regiongate_core::UserIdentity;
use regiongate_domain::AccessRequestStatus;
use uuid::Uuid;

use crate::dto::{AccessRequestResponse, CreateAccessRequestRequest, ReviewAccessRequestRequest};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct AccessRequestListQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn create_access_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateAccessRequestRequest>,
) -> ApiResult<(StatusCode, Json<AccessRequestResponse>)> {
    let request = state
        .grant_store_service
        .create_access_request(&user, payload.regions, payload.reason.as_str())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccessRequestResponse::from(request)),
    ))
}

pub async fn list_access_requests_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AccessRequestListQuery>,
) -> ApiResult<Json<Vec<AccessRequestResponse>>> {
    let status = query
        .status
        .as_deref()
        .map(AccessRequestStatus::from_str)
        .transpose()?;

    let requests = state
        .grant_store_service
        .list_access_requests(
            &user,
            AccessRequestQuery {
                user_id: None,
                status,
                limit: query.limit.unwrap_or(50),
                offset: query.offset.unwrap_or(0),
            },
        )
        .await?
        .into_iter()
        .map(AccessRequestResponse::from)
        .collect();

    Ok(Json(requests))
}

pub async fn approve_access_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ReviewAccessRequestRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let approved = state
        .grant_store_service
        .approve_access_request(&user, request_id, payload.review_notes)
        .await?;

    Ok(Json(AccessRequestResponse::from(approved.request)))
}

pub async fn reject_access_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ReviewAccessRequestRequest>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let request = state
        .grant_store_service
        .reject_access_request(&user, request_id, payload.review_notes)
        .await?;

    Ok(Json(AccessRequestResponse::from(request)))
}

pub async fn cancel_access_request_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .grant_store_service
        .cancel_access_request(&user, request_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
