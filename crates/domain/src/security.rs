use std::str::FromStr;

use regiongate_core::AppError;
use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a permanent region grant is created.
    RegionPermanentGranted,
    /// Emitted when a permanent region grant is removed.
    RegionPermanentRevoked,
    /// Emitted when a temporary region grant is created.
    RegionTemporaryGranted,
    /// Emitted when a temporary region grant gets a new expiry.
    RegionTemporaryExtended,
    /// Emitted when a temporary region grant is revoked.
    RegionTemporaryRevoked,
    /// Emitted when a user files an access request.
    AccessRequestCreated,
    /// Emitted when a reviewer approves an access request.
    AccessRequestApproved,
    /// Emitted when a reviewer rejects an access request.
    AccessRequestRejected,
    /// Emitted when an access request is withdrawn.
    AccessRequestCancelled,
    /// Emitted for every allow decision.
    AccessAllowed,
    /// Emitted for every deny decision and refused privileged action.
    AccessDenied,
    /// Emitted when audit history is purged.
    AuditLogPurged,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegionPermanentGranted => "region.permanent.granted",
            Self::RegionPermanentRevoked => "region.permanent.revoked",
            Self::RegionTemporaryGranted => "region.temporary.granted",
            Self::RegionTemporaryExtended => "region.temporary.extended",
            Self::RegionTemporaryRevoked => "region.temporary.revoked",
            Self::AccessRequestCreated => "access_request.created",
            Self::AccessRequestApproved => "access_request.approved",
            Self::AccessRequestRejected => "access_request.rejected",
            Self::AccessRequestCancelled => "access_request.cancelled",
            Self::AccessAllowed => "access.allowed",
            Self::AccessDenied => "access.denied",
            Self::AuditLogPurged => "audit.purged",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuditAction] = &[
            AuditAction::RegionPermanentGranted,
            AuditAction::RegionPermanentRevoked,
            AuditAction::RegionTemporaryGranted,
            AuditAction::RegionTemporaryExtended,
            AuditAction::RegionTemporaryRevoked,
            AuditAction::AccessRequestCreated,
            AuditAction::AccessRequestApproved,
            AuditAction::AccessRequestRejected,
            AuditAction::AccessRequestCancelled,
            AuditAction::AccessAllowed,
            AuditAction::AccessDenied,
            AuditAction::AuditLogPurged,
        ];

        ALL
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown audit action '{value}'")))
    }
}
