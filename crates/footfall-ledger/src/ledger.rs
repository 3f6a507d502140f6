use crate::error::{LedgerError, Result};
use footfall_core::{Clock, Coordinates, KvStore, StorageError, SystemClock, VisitorRecord};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Default cap on the number of distinct locations kept.
pub const DEFAULT_MAX_RECORDS: usize = 500;

#[derive(Debug, Clone, TypedBuilder)]
pub struct LedgerSettings {
    /// Oldest entries beyond this count are dropped on every write.
    #[builder(default = DEFAULT_MAX_RECORDS)]
    pub max_records: usize,
    /// Store key holding the visitor list.
    #[builder(default = "visitors".to_string(), setter(into))]
    pub visitors_key: String,
    /// Store key holding the most recent location label.
    #[builder(default = "last-visitor".to_string(), setter(into))]
    pub last_visitor_key: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Prepends `record`, keeps only the first record per location and caps
/// the list at `max_records`, dropping from the tail.
pub fn apply_visit(
    ledger: Vec<VisitorRecord>,
    record: VisitorRecord,
    max_records: usize,
) -> Vec<VisitorRecord> {
    let mut seen = HashSet::with_capacity(ledger.len() + 1);
    let mut updated: Vec<VisitorRecord> = std::iter::once(record)
        .chain(ledger)
        .filter(|r| seen.insert(r.location.clone()))
        .collect();
    updated.truncate(max_records);
    updated
}

/// A bounded, deduplicated, most-recent-first list of visitor locations.
///
/// Each update reads the whole list, edits it in memory and writes it
/// back. Concurrent updates are not coordinated: when two requests race,
/// the last write wins and the other visit is lost. That is acceptable
/// for a decorative visitor map and keeps the store contract to plain
/// `get`/`set`.
#[derive(Debug, Clone)]
pub struct VisitorLedger<S, C = SystemClock> {
    store: S,
    clock: C,
    settings: LedgerSettings,
}

impl<S: KvStore> VisitorLedger<S> {
    pub fn new(store: S, settings: LedgerSettings) -> Self {
        Self::with_clock(store, SystemClock, settings)
    }
}

impl<S: KvStore, C: Clock> VisitorLedger<S, C> {
    pub fn with_clock(store: S, clock: C, settings: LedgerSettings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Returns the persisted ledger, or an empty list if none exists.
    ///
    /// A stored value that is not a list of records, or that the store
    /// cannot decode at all, is treated as empty. Transport failures are
    /// returned as errors.
    pub async fn visitors(&self) -> Result<Vec<VisitorRecord>> {
        let key = &self.settings.visitors_key;
        let value = match self.store.get(key).await {
            Ok(value) => value,
            Err(StorageError::InvalidData(reason)) => {
                warn!(key, %reason, "Persisted ledger is undecodable, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let Some(value) = value else {
            trace!(key, "No ledger persisted yet");
            return Ok(Vec::new());
        };

        match serde_json::from_value::<Vec<VisitorRecord>>(value) {
            Ok(visitors) => Ok(visitors),
            Err(e) => {
                warn!(key, error = %e, "Persisted ledger is malformed, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Records a visit from `location` and returns the updated ledger.
    ///
    /// Without coordinates nothing is written and the current ledger is
    /// returned as is.
    pub async fn record_visit(
        &self,
        location: &str,
        coordinates: Option<Coordinates>,
    ) -> Result<Vec<VisitorRecord>> {
        let ledger = self.visitors().await?;

        let Some(coordinates) = coordinates else {
            debug!(location, "No coordinates for visit, ledger unchanged");
            return Ok(ledger);
        };

        let record = VisitorRecord::new(location, coordinates, self.clock.now());
        let updated = apply_visit(ledger, record, self.settings.max_records);

        let value = serde_json::to_value(&updated).map_err(|e| LedgerError::Encode(e.to_string()))?;
        self.store.set(&self.settings.visitors_key, value).await?;

        debug!(location, size = updated.len(), "Recorded visit");
        Ok(updated)
    }

    /// Returns the most recently stored location label, if any.
    pub async fn last_visitor(&self) -> Result<Option<String>> {
        let value = self.store.get(&self.settings.last_visitor_key).await?;
        Ok(match value {
            Some(Value::String(label)) => Some(label),
            Some(other) => {
                warn!(value = %other, "Last visitor pointer is not a string, ignoring");
                None
            }
            None => None,
        })
    }

    /// Overwrites the last-visitor pointer.
    pub async fn set_last_visitor(&self, label: &str) -> Result<()> {
        self.store
            .set(&self.settings.last_visitor_key, Value::from(label))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use footfall_core::clock::test_clock::TestClock;
    use footfall_store::InMemoryStore;
    use jiff::{SignedDuration, Timestamp};
    use serde_json::json;
    use std::sync::Arc;

    fn start() -> Timestamp {
        "2024-05-01T12:00:00Z".parse().unwrap()
    }

    fn coords(lat: f64, lon: f64) -> Option<Coordinates> {
        Coordinates::resolved(lat, lon)
    }

    fn ledger_with(
        max_records: usize,
    ) -> (VisitorLedger<Arc<InMemoryStore>, TestClock>, Arc<InMemoryStore>, TestClock) {
        let store = Arc::new(InMemoryStore::new());
        let clock = TestClock::new(start());
        let settings = LedgerSettings::builder().max_records(max_records).build();
        let ledger = VisitorLedger::with_clock(store.clone(), clock.clone(), settings);
        (ledger, store, clock)
    }

    fn record(location: &str, ts: Timestamp) -> VisitorRecord {
        VisitorRecord::new(location, Coordinates::resolved(1.0, 1.0).unwrap(), ts)
    }

    fn locations(records: &[VisitorRecord]) -> Vec<&str> {
        records.iter().map(|r| r.location.as_str()).collect()
    }

    #[test]
    fn apply_visit_prepends_dedupes_and_truncates() {
        let ts = start();
        let ledger = vec![record("Oslo", ts), record("Paris", ts), record("Lima", ts)];

        let updated = apply_visit(ledger, record("Paris", ts), 10);
        assert_eq!(locations(&updated), ["Paris", "Oslo", "Lima"]);

        let updated = apply_visit(updated, record("Rome", ts), 3);
        assert_eq!(locations(&updated), ["Rome", "Paris", "Oslo"]);
    }

    #[test]
    fn apply_visit_is_case_sensitive() {
        let ts = start();
        let updated = apply_visit(vec![record("paris", ts)], record("Paris", ts), 10);
        assert_eq!(locations(&updated), ["Paris", "paris"]);
    }

    #[tokio::test]
    async fn first_visit_into_empty_ledger() {
        let (ledger, store, _) = ledger_with(DEFAULT_MAX_RECORDS);

        let visitors = ledger
            .record_visit("Paris, France", coords(48.85, 2.35))
            .await
            .unwrap();

        assert_eq!(visitors.len(), 1);
        assert_eq!(visitors[0].location, "Paris, France");
        assert_eq!(visitors[0].latitude, 48.85);
        assert_eq!(visitors[0].timestamp, start());
        assert_eq!(ledger.visitors().await.unwrap(), visitors);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn repeat_location_moves_to_front_with_new_data() {
        let (ledger, _, clock) = ledger_with(DEFAULT_MAX_RECORDS);

        ledger.record_visit("Paris, France", coords(48.85, 2.35)).await.unwrap();
        clock.advance(SignedDuration::from_secs(60));
        ledger.record_visit("Oslo, Norway", coords(59.91, 10.75)).await.unwrap();
        clock.advance(SignedDuration::from_secs(60));
        let visitors = ledger
            .record_visit("Paris, France", coords(48.86, 2.36))
            .await
            .unwrap();

        assert_eq!(locations(&visitors), ["Paris, France", "Oslo, Norway"]);
        assert_eq!(visitors[0].latitude, 48.86);
        assert_eq!(visitors[0].longitude, 2.36);
        assert_eq!(visitors[0].timestamp, start() + SignedDuration::from_secs(120));
    }

    #[tokio::test]
    async fn same_location_twice_keeps_single_entry() {
        let (ledger, _, clock) = ledger_with(DEFAULT_MAX_RECORDS);

        ledger.record_visit("Paris, France", coords(48.85, 2.35)).await.unwrap();
        clock.advance(SignedDuration::from_secs(5));
        let visitors = ledger
            .record_visit("Paris, France", coords(48.86, 2.36))
            .await
            .unwrap();

        assert_eq!(visitors.len(), 1);
        assert_eq!(visitors[0].latitude, 48.86);
        assert!(visitors[0].timestamp > start());
    }

    #[tokio::test]
    async fn filling_to_exactly_the_cap_keeps_everything() {
        let (ledger, _, _) = ledger_with(5);

        for i in 0..5 {
            ledger
                .record_visit(&format!("City {i}"), coords(10.0 + i as f64, 20.0))
                .await
                .unwrap();
        }

        let visitors = ledger.visitors().await.unwrap();
        assert_eq!(visitors.len(), 5);
        assert_eq!(visitors[0].location, "City 4");
        assert_eq!(visitors[4].location, "City 0");
    }

    #[tokio::test]
    async fn one_past_the_cap_drops_the_oldest() {
        let (ledger, _, _) = ledger_with(5);

        for i in 0..6 {
            ledger
                .record_visit(&format!("City {i}"), coords(10.0 + i as f64, 20.0))
                .await
                .unwrap();
        }

        let visitors = ledger.visitors().await.unwrap();
        assert_eq!(visitors.len(), 5);
        assert_eq!(visitors[0].location, "City 5");
        assert_eq!(visitors[4].location, "City 1");
        assert!(!visitors.iter().any(|v| v.location == "City 0"));
    }

    #[tokio::test]
    async fn missing_coordinates_do_not_write() {
        let (ledger, store, _) = ledger_with(DEFAULT_MAX_RECORDS);
        let before = ledger
            .record_visit("Paris, France", coords(48.85, 2.35))
            .await
            .unwrap();

        let after = ledger.record_visit("Oslo, Norway", None).await.unwrap();

        assert_eq!(after, before);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn missing_coordinates_on_empty_ledger() {
        let (ledger, store, _) = ledger_with(DEFAULT_MAX_RECORDS);

        let visitors = ledger.record_visit("Oslo, Norway", None).await.unwrap();

        assert!(visitors.is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn malformed_ledger_reads_as_empty() {
        let (ledger, store, _) = ledger_with(DEFAULT_MAX_RECORDS);
        store.set("visitors", json!({"not": "a list"})).await.unwrap();

        assert!(ledger.visitors().await.unwrap().is_empty());

        let visitors = ledger
            .record_visit("Lima, Peru", coords(-12.05, -77.04))
            .await
            .unwrap();
        assert_eq!(locations(&visitors), ["Lima, Peru"]);
    }

    #[tokio::test]
    async fn reads_ledger_written_by_other_clients() {
        let (ledger, store, _) = ledger_with(DEFAULT_MAX_RECORDS);
        store
            .set(
                "visitors",
                json!([{
                    "location": "Tokyo, Japan",
                    "timestamp": "2024-04-30T08:00:00.000Z",
                    "latitude": 35.68,
                    "longitude": 139.69,
                }]),
            )
            .await
            .unwrap();

        let visitors = ledger
            .record_visit("Paris, France", coords(48.85, 2.35))
            .await
            .unwrap();
        assert_eq!(locations(&visitors), ["Paris, France", "Tokyo, Japan"]);
    }

    #[tokio::test]
    async fn last_visitor_pointer_round_trip() {
        let (ledger, store, _) = ledger_with(DEFAULT_MAX_RECORDS);
        assert_eq!(ledger.last_visitor().await.unwrap(), None);

        ledger.set_last_visitor("Oslo, Norway").await.unwrap();
        assert_eq!(ledger.last_visitor().await.unwrap().as_deref(), Some("Oslo, Norway"));

        store.set("last-visitor", json!(42)).await.unwrap();
        assert_eq!(ledger.last_visitor().await.unwrap(), None);
    }

    #[tokio::test]
    async fn custom_keys_are_honoured() {
        let store = Arc::new(InMemoryStore::new());
        let settings = LedgerSettings::builder()
            .visitors_key("globe:visitors")
            .last_visitor_key("globe:last")
            .build();
        let ledger = VisitorLedger::new(store.clone(), settings);

        ledger.record_visit("Paris, France", coords(48.85, 2.35)).await.unwrap();
        ledger.set_last_visitor("Paris, France").await.unwrap();

        assert!(store.get("globe:visitors").await.unwrap().is_some());
        assert!(store.get("globe:last").await.unwrap().is_some());
        assert!(store.get("visitors").await.unwrap().is_none());
    }

    struct DownStore;

    #[async_trait]
    impl KvStore for DownStore {
        async fn get(&self, _key: &str) -> footfall_core::Result<Option<Value>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: Value) -> footfall_core::Result<()> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    /// Holds text it cannot decode under the ledger key until overwritten,
    /// the way a shared store answers for a corrupted value.
    #[derive(Default)]
    struct CorruptedStore {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl KvStore for CorruptedStore {
        async fn get(&self, key: &str) -> footfall_core::Result<Option<Value>> {
            match self.inner.get(key).await? {
                None if key == "visitors" => Err(StorageError::InvalidData(format!(
                    "invalid stored value for key 'ff:{key}'"
                ))),
                other => Ok(other),
            }
        }

        async fn set(&self, key: &str, value: Value) -> footfall_core::Result<()> {
            self.inner.set(key, value).await
        }
    }

    #[tokio::test]
    async fn undecodable_ledger_reads_as_empty_and_is_overwritten() {
        let store = Arc::new(CorruptedStore::default());
        let ledger = VisitorLedger::new(store.clone(), LedgerSettings::default());

        assert!(ledger.visitors().await.unwrap().is_empty());

        let visitors = ledger
            .record_visit("Paris, France", coords(48.85, 2.35))
            .await
            .unwrap();
        assert_eq!(locations(&visitors), ["Paris, France"]);
        assert_eq!(store.inner.write_count(), 1);

        let visitors = ledger
            .record_visit("Oslo, Norway", coords(59.91, 10.75))
            .await
            .unwrap();
        assert_eq!(locations(&visitors), ["Oslo, Norway", "Paris, France"]);
    }

    #[tokio::test]
    async fn unavailable_store_surfaces_storage_error() {
        let ledger = VisitorLedger::new(DownStore, LedgerSettings::default());

        let err = ledger
            .record_visit("Paris, France", coords(48.85, 2.35))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Storage(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn ledger_never_exceeds_cap_under_mixed_traffic() {
        let (ledger, _, clock) = ledger_with(7);
        let cities = ["A", "B", "C", "A", "D", "E", "B", "F", "G", "H", "A", "I"];

        for (i, city) in cities.iter().enumerate() {
            clock.advance(SignedDuration::from_secs(1));
            let visitors = ledger
                .record_visit(city, coords(1.0 + i as f64, 1.0))
                .await
                .unwrap();

            assert!(visitors.len() <= 7);
            assert_eq!(visitors[0].location, *city);
            let unique: HashSet<&str> = locations(&visitors).into_iter().collect();
            assert_eq!(unique.len(), visitors.len());
        }
    }
}
