use std::collections::BTreeSet;

use regiongate_domain::RegionName;
use tokio::sync::RwLock;

use super::AccessChanged;

/// Versioned copy of the regions a session may work in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSnapshot {
    /// Incremented on every replacement.
    pub version: u64,
    /// Cached regions.
    pub regions: BTreeSet<RegionName>,
}

/// Session-scoped region cache.
#[derive(Debug, Default)]
pub struct RegionCache {
    snapshot: RwLock<RegionSnapshot>,
}

impl RegionCache {
    /// Creates a cache at version zero.
    #[must_use]
    pub fn new(regions: BTreeSet<RegionName>) -> Self {
        Self {
            snapshot: RwLock::new(RegionSnapshot {
                version: 0,
                regions,
            }),
        }
    }

    /// Returns a copy of the cached state.
    pub async fn snapshot(&self) -> RegionSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Whether `region` is cached.
    pub async fn contains(&self, region: &RegionName) -> bool {
        self.snapshot.read().await.regions.contains(region)
    }

    /// Whether no regions are cached.
    pub async fn is_empty(&self) -> bool {
        self.snapshot.read().await.regions.is_empty()
    }

    /// Replaces the cached set when it differs from `regions`.
    pub async fn replace_if_changed(&self, regions: BTreeSet<RegionName>) -> Option<AccessChanged> {
        let mut snapshot = self.snapshot.write().await;
        if snapshot.regions == regions {
            return None;
        }

        snapshot.version += 1;
        let previous = std::mem::replace(&mut snapshot.regions, regions);

        Some(AccessChanged {
            previous,
            current: snapshot.regions.clone(),
            version: snapshot.version,
        })
    }
}
