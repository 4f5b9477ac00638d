use regiongate_domain::{RegionGrant, TemporaryGrant};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for assigning permanent regions.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/assign-permanent-regions-request.ts"
)]
pub struct AssignPermanentRegionsRequest {
    pub user_id: String,
    pub regions: Vec<String>,
}

/// Incoming payload for removing one permanent region.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/revoke-permanent-region-request.ts"
)]
pub struct RevokePermanentRegionRequest {
    pub user_id: String,
    pub region: String,
}

/// Incoming payload for temporary grant creation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-temporary-grant-request.ts"
)]
pub struct CreateTemporaryGrantRequest {
    pub user_id: String,
    pub region: String,
    pub expires_at: String,
    pub reason: String,
}

/// Incoming payload for moving a temporary grant's expiry.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/extend-temporary-grant-request.ts"
)]
pub struct ExtendTemporaryGrantRequest {
    pub expires_at: String,
}

/// Optional payload for temporary grant revocation.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/revoke-temporary-grant-request.ts"
)]
pub struct RevokeTemporaryGrantRequest {
    #[serde(default)]
    #[ts(optional)]
    pub reason: Option<String>,
}

/// API representation of a permanent region grant.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/region-grant-response.ts"
)]
pub struct RegionGrantResponse {
    pub user_id: String,
    pub region: String,
    pub granted_by: String,
    pub granted_at: String,
}

/// API representation of a temporary region grant.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/temporary-grant-response.ts"
)]
pub struct TemporaryGrantResponse {
    pub grant_id: String,
    pub user_id: String,
    pub region: String,
    pub expires_at: String,
    pub granted_by: String,
    pub reason: String,
    pub created_at: String,
    pub revoked_at: Option<String>,
    pub revoked_by: Option<String>,
    pub revoke_reason: Option<String>,
}

impl From<RegionGrant> for RegionGrantResponse {
    fn from(value: RegionGrant) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            region: value.region.into(),
            granted_by: value.granted_by,
            granted_at: value.granted_at.to_rfc3339(),
        }
    }
}

impl From<TemporaryGrant> for TemporaryGrantResponse {
    fn from(value: TemporaryGrant) -> Self {
        Self {
            grant_id: value.grant_id.to_string(),
            user_id: value.user_id.to_string(),
            region: value.region.into(),
            expires_at: value.expires_at.to_rfc3339(),
            granted_by: value.granted_by,
            reason: value.reason,
            created_at: value.created_at.to_rfc3339(),
            revoked_at: value.revoked_at.map(|revoked_at| revoked_at.to_rfc3339()),
            revoked_by: value.revoked_by,
            revoke_reason: value.revoke_reason,
        }
    }
}
