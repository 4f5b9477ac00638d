use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EffectiveRegions, RegionCoverage, RegionName};

/// Why access was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessBasis {
    /// Administrator override.
    Administrative,
    /// Permanent region grant.
    Permanent,
    /// Active temporary grant and no permanent grant.
    Temporary {
        /// Grant providing the access.
        grant_id: Uuid,
        /// Expiry of that grant.
        expires_at: DateTime<Utc>,
    },
}

/// Why access was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The region is outside the caller's effective regions.
    NotGranted {
        /// Effective regions at evaluation time, for operator feedback.
        effective_regions: Vec<RegionName>,
    },
    /// Grants could not be loaded; evaluation fails closed.
    StoreUnavailable,
}

/// Outcome of evaluating one (user, region, instant) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access allowed.
    Allow(AccessBasis),
    /// Access denied.
    Deny(DenyReason),
}

impl AccessDecision {
    /// Decides access for a non-administrative caller from their effective regions.
    #[must_use]
    pub fn from_effective_regions(target: &RegionName, effective: &EffectiveRegions) -> Self {
        match effective.coverage(target) {
            Some(RegionCoverage::Permanent) => Self::Allow(AccessBasis::Permanent),
            Some(RegionCoverage::Temporary {
                grant_id,
                expires_at,
            }) => Self::Allow(AccessBasis::Temporary {
                grant_id,
                expires_at,
            }),
            None => Self::Deny(DenyReason::NotGranted {
                effective_regions: effective.names().cloned().collect(),
            }),
        }
    }

    /// Whether the decision allows access.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    /// Whether access is allowed only through a temporary grant.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Allow(AccessBasis::Temporary { .. }))
    }

    /// Expiry of the temporary grant backing an allow decision.
    #[must_use]
    pub fn temporary_expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Allow(AccessBasis::Temporary { expires_at, .. }) => Some(*expires_at),
            _ => None,
        }
    }

    /// Human-readable message for the caller.
    #[must_use]
    pub fn message(&self, target: &RegionName) -> String {
        match self {
            Self::Allow(AccessBasis::Administrative) => {
                format!("access to '{target}' allowed (administrator)")
            }
            Self::Allow(AccessBasis::Permanent) => format!("access to '{target}' allowed"),
            Self::Allow(AccessBasis::Temporary { expires_at, .. }) => format!(
                "access to '{target}' allowed (Temporary Access until {})",
                expires_at.to_rfc3339()
            ),
            Self::Deny(DenyReason::NotGranted { effective_regions })
                if effective_regions.is_empty() =>
            {
                format!("access to '{target}' denied: you have no assigned regions")
            }
            Self::Deny(DenyReason::NotGranted { effective_regions }) => {
                let names = effective_regions
                    .iter()
                    .map(RegionName::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("access to '{target}' denied: your regions are {names}")
            }
            Self::Deny(DenyReason::StoreUnavailable) => format!(
                "access to '{target}' denied: region grants are unavailable, try again later"
            ),
        }
    }
}
