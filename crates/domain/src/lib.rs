//! Domain entities and invariants for region-based access control.

#![forbid(unsafe_code)]

mod access;
mod access_request;
mod effective;
mod grant;
mod region;
mod security;

pub use access::{AccessBasis, AccessDecision, DenyReason};
pub use access_request::{
    ACCESS_REQUEST_MAX_REGIONS, ACCESS_REQUEST_MIN_REASON_LENGTH, AccessRequest,
    AccessRequestDraft, AccessRequestStatus, REVIEW_NOTES_MAX_LENGTH, normalize_review_notes,
};
pub use effective::{EffectiveRegions, RegionCoverage};
pub use grant::{RegionGrant, TemporaryGrant, TemporaryGrantDraft, validate_future_expiry};
pub use region::{REGION_NAME_MAX_LENGTH, RegionName};
pub use security::AuditAction;
