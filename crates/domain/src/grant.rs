use chrono::{DateTime, Utc};
use regiongate_core::{AppError, AppResult, NonEmptyString, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RegionName;

/// Permanent region assignment. Has no expiry; removed only by revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionGrant {
    /// Grantee.
    pub user_id: UserId,
    /// Granted region.
    pub region: RegionName,
    /// Actor subject that created the grant.
    pub granted_by: String,
    /// Creation timestamp.
    pub granted_at: DateTime<Utc>,
}

/// Time-boxed region grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryGrant {
    /// Stable grant id.
    pub grant_id: Uuid,
    /// Grantee.
    pub user_id: UserId,
    /// Granted region.
    pub region: RegionName,
    /// Instant at which the grant stops being active.
    pub expires_at: DateTime<Utc>,
    /// Actor subject that created the grant.
    pub granted_by: String,
    /// Justification captured at grant time.
    pub reason: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Revocation timestamp, when revoked.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Actor subject that revoked the grant.
    pub revoked_by: Option<String>,
    /// Optional revocation reason.
    pub revoke_reason: Option<String>,
}

impl TemporaryGrant {
    /// A temporary grant is active iff it is not revoked and `expires_at > now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }

    /// Whether the grant has been explicitly revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Validated input for a new temporary grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryGrantDraft {
    region: RegionName,
    expires_at: DateTime<Utc>,
    reason: NonEmptyString,
}

impl TemporaryGrantDraft {
    /// Validates region, reason and expiry against the supplied clock reading.
    pub fn new(
        region: impl Into<String>,
        expires_at: DateTime<Utc>,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let region = RegionName::new(region)?;
        validate_future_expiry(expires_at, now)?;
        let reason = NonEmptyString::new(reason.into().trim().to_owned()).map_err(|_| {
            AppError::Validation("temporary grant reason must not be empty".to_owned())
        })?;

        Ok(Self {
            region,
            expires_at,
            reason,
        })
    }

    /// Returns the granted region.
    #[must_use]
    pub fn region(&self) -> &RegionName {
        &self.region
    }

    /// Returns the requested expiry.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the grant reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }
}

/// Rejects expiry timestamps that are not strictly in the future.
pub fn validate_future_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if expires_at <= now {
        return Err(AppError::Validation(format!(
            "expiresAt must be in the future (got '{}', now '{}')",
            expires_at.to_rfc3339(),
            now.to_rfc3339()
        )));
    }

    Ok(())
}
