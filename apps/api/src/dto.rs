mod access;
mod audit;
mod common;
mod grants;
mod requests;

pub use access::{
    AccessDecisionResponse, EffectiveRegionResponse, EffectiveRegionsResponse,
    EvaluateRegionRequest,
};
pub use audit::{AuditLogEntryResponse, AuditPurgeResultResponse, PurgeAuditLogRequest};
pub use common::{HealthResponse, parse_timestamp, parse_user_id};
pub use grants::{
    AssignPermanentRegionsRequest, CreateTemporaryGrantRequest, ExtendTemporaryGrantRequest,
    RegionGrantResponse, RevokePermanentRegionRequest, RevokeTemporaryGrantRequest,
    TemporaryGrantResponse,
};
pub use requests::{AccessRequestResponse, CreateAccessRequestRequest, ReviewAccessRequestRequest};
