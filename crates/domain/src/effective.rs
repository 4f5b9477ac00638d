//! Effective region resolution.
//!
//! The effective set is derived from grant records at a given instant and is
//! never patched incrementally: a region is present iff a permanent grant
//! covers it or an active temporary grant does.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use regiongate_core::UserId;
use uuid::Uuid;

use crate::{RegionGrant, RegionName, TemporaryGrant};

/// How a region in the effective set is covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionCoverage {
    /// Covered by a permanent grant. Takes precedence over any temporary grant.
    Permanent,
    /// Covered only by an active temporary grant.
    Temporary {
        /// Grant providing the access.
        grant_id: Uuid,
        /// Expiry of that grant.
        expires_at: DateTime<Utc>,
    },
}

/// Regions a user may act on at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveRegions {
    regions: BTreeMap<RegionName, RegionCoverage>,
}

impl EffectiveRegions {
    /// Resolves the effective set for `user_id` at `now`.
    ///
    /// Records belonging to other users and inactive temporary grants are
    /// ignored. When several temporary grants cover one region, the one that
    /// expires last is reported.
    #[must_use]
    pub fn resolve(
        user_id: UserId,
        permanent: &[RegionGrant],
        temporary: &[TemporaryGrant],
        now: DateTime<Utc>,
    ) -> Self {
        let mut regions = BTreeMap::new();

        for grant in temporary
            .iter()
            .filter(|grant| grant.user_id == user_id && grant.is_active(now))
        {
            let candidate = RegionCoverage::Temporary {
                grant_id: grant.grant_id,
                expires_at: grant.expires_at,
            };

            regions
                .entry(grant.region.clone())
                .and_modify(|current| {
                    if let RegionCoverage::Temporary { expires_at, .. } = current
                        && grant.expires_at > *expires_at
                    {
                        *current = candidate;
                    }
                })
                .or_insert(candidate);
        }

        for grant in permanent.iter().filter(|grant| grant.user_id == user_id) {
            regions.insert(grant.region.clone(), RegionCoverage::Permanent);
        }

        Self { regions }
    }

    /// Returns how `region` is covered, if at all.
    #[must_use]
    pub fn coverage(&self, region: &RegionName) -> Option<RegionCoverage> {
        self.regions.get(region).copied()
    }

    /// Whether `region` is in the effective set.
    #[must_use]
    pub fn contains(&self, region: &RegionName) -> bool {
        self.regions.contains_key(region)
    }

    /// Returns the region names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &RegionName> {
        self.regions.keys()
    }

    /// Returns the region names in ascending order, consuming the set.
    #[must_use]
    pub fn into_names(self) -> Vec<RegionName> {
        self.regions.into_keys().collect()
    }

    /// Number of effective regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no region is effective.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
