use regiongate_domain::AccessRequest;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for a new access request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-access-request-request.ts"
)]
pub struct CreateAccessRequestRequest {
    pub regions: Vec<String>,
    pub reason: String,
}

/// Incoming payload for approving or rejecting an access request.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/review-access-request-request.ts"
)]
pub struct ReviewAccessRequestRequest {
    #[serde(default)]
    #[ts(optional)]
    pub review_notes: Option<String>,
}

/// API representation of an access request.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/access-request-response.ts"
)]
pub struct AccessRequestResponse {
    pub request_id: String,
    pub user_id: String,
    pub regions: Vec<String>,
    pub reason: String,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<String>,
    pub created_at: String,
}

impl From<AccessRequest> for AccessRequestResponse {
    fn from(value: AccessRequest) -> Self {
        Self {
            request_id: value.request_id.to_string(),
            user_id: value.user_id.to_string(),
            regions: value.regions.into_iter().map(String::from).collect(),
            reason: value.reason,
            status: value.status.as_str().to_owned(),
            reviewed_by: value.reviewed_by,
            review_notes: value.review_notes,
            reviewed_at: value.reviewed_at.map(|reviewed_at| reviewed_at.to_rfc3339()),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}
