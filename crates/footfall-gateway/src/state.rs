use crate::writings::WritingSource;
use footfall_core::KvStore;
use footfall_ledger::{GeoResolver, LedgerSettings, VisitTracker, VisitorLedger};
use footfall_store::CachedStore;
use std::sync::Arc;
use std::time::Duration;

pub type Tracker = VisitTracker<Arc<dyn KvStore>, Arc<dyn GeoResolver>>;
pub type Listing = VisitorLedger<Arc<dyn KvStore>>;

/// Builds the read-only ledger behind the list endpoint.
///
/// Only this ledger reads through the cache. The tracker must see the
/// backend directly, or a stale read would overwrite visits recorded by
/// other instances.
pub fn listing(
    store: Arc<dyn KvStore>,
    settings: LedgerSettings,
    cache_ttl: Duration,
) -> Listing {
    if cache_ttl.is_zero() {
        return VisitorLedger::new(store, settings);
    }
    let cached: Arc<dyn KvStore> = Arc::new(CachedStore::new(store, cache_ttl));
    VisitorLedger::new(cached, settings)
}

#[derive(Clone)]
pub struct AppState {
    tracker: Arc<Tracker>,
    listing: Arc<Listing>,
    writings: Arc<WritingSource>,
}

impl AppState {
    pub fn new(tracker: Tracker, listing: Listing, writings: WritingSource) -> Self {
        Self {
            tracker: Arc::new(tracker),
            listing: Arc::new(listing),
            writings: Arc::new(writings),
        }
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn writings(&self) -> &WritingSource {
        &self.writings
    }
}
