use regiongate_core::UserId;
use regiongate_domain::{AccessDecision, EffectiveRegions, RegionCoverage, RegionName};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for a region access check.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/evaluate-region-request.ts"
)]
pub struct EvaluateRegionRequest {
    pub region: String,
}

/// Outcome of a region access check.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/access-decision-response.ts"
)]
pub struct AccessDecisionResponse {
    pub allowed: bool,
    pub temporary: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub expires_at: Option<String>,
}

impl AccessDecisionResponse {
    pub fn from_decision(region: &RegionName, decision: &AccessDecision) -> Self {
        Self {
            allowed: decision.is_allowed(),
            temporary: decision.is_temporary(),
            message: decision.message(region),
            expires_at: decision
                .temporary_expires_at()
                .map(|expires_at| expires_at.to_rfc3339()),
        }
    }
}

/// One region in an effective regions listing.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/effective-region-response.ts"
)]
pub struct EffectiveRegionResponse {
    pub name: String,
    pub temporary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub expires_at: Option<String>,
}

/// Effective regions of one user at request time.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/effective-regions-response.ts"
)]
pub struct EffectiveRegionsResponse {
    pub success: bool,
    pub user_id: String,
    pub regions: Vec<EffectiveRegionResponse>,
}

impl EffectiveRegionsResponse {
    pub fn from_effective_regions(user_id: UserId, value: &EffectiveRegions) -> Self {
        let regions = value
            .names()
            .map(|name| {
                let temporary_until = match value.coverage(name) {
                    Some(RegionCoverage::Temporary { expires_at, .. }) => Some(expires_at),
                    _ => None,
                };

                EffectiveRegionResponse {
                    name: name.as_str().to_owned(),
                    temporary: temporary_until.is_some(),
                    expires_at: temporary_until.map(|expires_at| expires_at.to_rfc3339()),
                }
            })
            .collect();

        Self {
            success: true,
            user_id: user_id.to_string(),
            regions,
        }
    }
}
