use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use regiongate_core::{AppError, AppResult, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RegionName;

/// Minimum trimmed length of an access request reason.
pub const ACCESS_REQUEST_MIN_REASON_LENGTH: usize = 10;

/// Maximum number of distinct regions in one access request.
pub const ACCESS_REQUEST_MAX_REGIONS: usize = 50;

/// Maximum length of reviewer notes.
pub const REVIEW_NOTES_MAX_LENGTH: usize = 1_000;

/// Lifecycle status of an access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRequestStatus {
    /// Awaiting review.
    Pending,
    /// Approved; permanent grants exist for every requested region.
    Approved,
    /// Rejected by a reviewer.
    Rejected,
    /// Withdrawn before review.
    Cancelled,
}

impl AccessRequestStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Only pending requests may transition; every other status is terminal.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(self, Self::Pending) && !matches!(next, Self::Pending)
    }
}

impl FromStr for AccessRequestStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "unknown access request status '{value}'"
            ))),
        }
    }
}

/// A user's request for permanent access to one or more regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Stable request id.
    pub request_id: Uuid,
    /// Requesting user.
    pub user_id: UserId,
    /// Distinct requested regions, sorted.
    pub regions: Vec<RegionName>,
    /// Justification.
    pub reason: String,
    /// Current status.
    pub status: AccessRequestStatus,
    /// Reviewer subject, once reviewed.
    pub reviewed_by: Option<String>,
    /// Reviewer notes.
    pub review_notes: Option<String>,
    /// Review timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl AccessRequest {
    /// Whether the request still awaits review.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == AccessRequestStatus::Pending
    }
}

/// Validated input for a new access request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequestDraft {
    regions: Vec<RegionName>,
    reason: String,
}

impl AccessRequestDraft {
    /// Validates and deduplicates requested regions and checks the reason length.
    pub fn new(regions: Vec<String>, reason: impl Into<String>) -> AppResult<Self> {
        let regions = regions
            .into_iter()
            .map(RegionName::new)
            .collect::<AppResult<BTreeSet<_>>>()?;

        if regions.is_empty() {
            return Err(AppError::Validation(
                "select at least one region".to_owned(),
            ));
        }

        if regions.len() > ACCESS_REQUEST_MAX_REGIONS {
            return Err(AppError::Validation(format!(
                "an access request may include at most {ACCESS_REQUEST_MAX_REGIONS} regions"
            )));
        }

        let reason = reason.into().trim().to_owned();
        if reason.chars().count() < ACCESS_REQUEST_MIN_REASON_LENGTH {
            return Err(AppError::Validation(format!(
                "reason must be at least {ACCESS_REQUEST_MIN_REASON_LENGTH} characters"
            )));
        }

        Ok(Self {
            regions: regions.into_iter().collect(),
            reason,
        })
    }

    /// Returns the requested regions, sorted and distinct.
    #[must_use]
    pub fn regions(&self) -> &[RegionName] {
        self.regions.as_slice()
    }

    /// Returns the trimmed reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }
}

/// Trims reviewer notes, drops blank ones and enforces the length limit.
pub fn normalize_review_notes(notes: Option<String>) -> AppResult<Option<String>> {
    let Some(notes) = notes else {
        return Ok(None);
    };

    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > REVIEW_NOTES_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "review notes must be at most {REVIEW_NOTES_MAX_LENGTH} characters"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}
