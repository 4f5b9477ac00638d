use axum::Json;
use axum::extract::{Extension, Query, State};
use chrono::Utc;
use regiongate_core::UserIdentity;
use regiongate_domain::RegionName;
use tracing::info;

use crate::dto::{
    AccessDecisionResponse, EffectiveRegionsResponse, EvaluateRegionRequest, parse_user_id,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveRegionsQuery {
    pub user_id: Option<String>,
}

pub async fn effective_regions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<EffectiveRegionsQuery>,
) -> ApiResult<Json<EffectiveRegionsResponse>> {
    let user_id = match query.user_id.as_deref() {
        Some(value) => parse_user_id("userId", value)?,
        None => user.user_id(),
    };

    let effective = state
        .grant_store_service
        .effective_regions_for(&user, user_id, Utc::now())
        .await?;

    Ok(Json(EffectiveRegionsResponse::from_effective_regions(
        user_id, &effective,
    )))
}

pub async fn evaluate_region_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<EvaluateRegionRequest>,
) -> ApiResult<Json<AccessDecisionResponse>> {
    let region = RegionName::new(payload.region)?;
    let decision = state
        .access_evaluator
        .evaluate(&user, &region, Utc::now())
        .await;

    info!(
        user_id = %user.user_id(),
        region = %region,
        allowed = decision.is_allowed(),
        "region access evaluated"
    );

    Ok(Json(AccessDecisionResponse::from_decision(
        &region, &decision,
    )))
}
