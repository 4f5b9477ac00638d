use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use regiongate_core::UserIdentity;
use regiongate_domain::RegionName;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{
    AccessChanged, EffectiveRegionsSource, ReconcilerHandle, ReconcilerSchedule, RegionCache,
    SessionReconciler,
};

/// State shared between a signed-in session and its reconciler.
#[derive(Debug)]
pub struct SessionContext {
    identity: UserIdentity,
    cache: RegionCache,
    authenticated: AtomicBool,
}

impl SessionContext {
    /// Creates an authenticated session seeded with the regions returned at sign-in.
    #[must_use]
    pub fn new(identity: UserIdentity, regions: BTreeSet<RegionName>) -> Self {
        Self {
            identity,
            cache: RegionCache::new(regions),
            authenticated: AtomicBool::new(true),
        }
    }

    /// Returns the signed-in identity.
    #[must_use]
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Returns the session's region cache.
    #[must_use]
    pub fn cache(&self) -> &RegionCache {
        &self.cache
    }

    /// Whether the session is still signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    pub(super) fn end(&self) {
        self.authenticated.store(false, Ordering::Release);
    }
}

/// A signed-in session owning its reconciler.
pub struct ClientSession {
    context: Arc<SessionContext>,
    reconciler: Option<ReconcilerHandle>,
}

impl ClientSession {
    /// Signs in with the identity and regions returned by the server.
    #[must_use]
    pub fn login(identity: UserIdentity, regions: BTreeSet<RegionName>) -> Self {
        Self {
            context: Arc::new(SessionContext::new(identity, regions)),
            reconciler: None,
        }
    }

    /// Signs in and seeds the cache with the regions `source` reports for `identity`.
    ///
    /// Falls back to `fallback` when the fetch fails; the first tick corrects it.
    pub async fn login_with_source(
        identity: UserIdentity,
        source: &dyn EffectiveRegionsSource,
        fallback: BTreeSet<RegionName>,
    ) -> Self {
        let regions = match source.fetch_effective_regions(identity.user_id()).await {
            Ok(regions) => regions,
            Err(error) => {
                warn!(
                    user_id = %identity.user_id(),
                    error = %error,
                    fallback_count = fallback.len(),
                    "failed to load regions at sign-in, using fallback"
                );
                fallback
            }
        };

        Self::login(identity, regions)
    }

    /// Returns the shared session state.
    #[must_use]
    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Returns the running reconciler, if started.
    #[must_use]
    pub fn reconciler(&self) -> Option<&ReconcilerHandle> {
        self.reconciler.as_ref()
    }

    /// Starts background reconciliation, replacing any previous reconciler.
    pub fn start_reconciler(
        &mut self,
        source: Arc<dyn EffectiveRegionsSource>,
        schedule: ReconcilerSchedule,
    ) -> broadcast::Receiver<AccessChanged> {
        let reconciler = SessionReconciler::new(Arc::clone(&self.context), source);
        let notifications = reconciler.subscribe();
        self.reconciler = Some(reconciler.spawn(schedule));

        notifications
    }

    /// Signs out and tears down the reconciler.
    pub async fn logout(mut self) {
        self.context.end();
        if let Some(reconciler) = self.reconciler.take() {
            reconciler.shutdown().await;
        }

        info!(user_id = %self.context.identity().user_id(), "session ended");
    }
}
