//! Indirect hash index.

use crate::broadcast::{InvalidationBroadcaster, SubscriptionHandle};
use crate::config::IndexConfig;
use crate::error::CacheResult;
use crate::index::Bucket;
use crate::stats::{IndexStats, IndexStatsSnapshot};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tracing::{debug, warn};

type Extractor<K, R> = Box<dyn Fn(&R) -> Vec<K> + Send + Sync>;
type Source<R> = Box<dyn Fn() -> CacheResult<Vec<R>> + Send + Sync>;

/// State shared with the broadcaster callback.
///
/// The callback only holds a `Weak` to this, so it never keeps a dropped
/// index alive.
#[derive(Debug, Default)]
struct Shared {
    /// Bumped on every invalidation. A map is valid only while its
    /// `built_at` equals this value.
    epoch: AtomicU64,
    stats: IndexStats,
}

impl Shared {
    fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.stats.record_invalidation();
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

/// One immutable build of the index.
struct Built<K, R> {
    built_at: u64,
    buckets: HashMap<K, Bucket<R>>,
    record_count: usize,
    unreachable: usize,
}

/// Summary of the current build, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    /// Index name.
    pub name: String,
    /// Records returned by the source at the last build.
    pub records: usize,
    /// Distinct keys in the map.
    pub keys: usize,
    /// Records whose extractor yielded no keys.
    pub unreachable: usize,
    /// Size of the largest bucket.
    pub largest_bucket: usize,
}

/// Hash index from an indirect key to every record that could match it.
///
/// `IndirectIndex` answers "which records could apply to this object?" in
/// O(1) by grouping records under every key their extractor yields. It
/// never owns the authoritative collection: on the first query after an
/// invalidation it calls the source accessor and rebuilds the whole map.
///
/// # Extractor contract
///
/// For every record `r` and query object `q` that `r` truly matches, the
/// extractor of `r` must yield the key of `q`. Yielding extra keys is
/// harmless; missing one silently hides matches.
///
/// # Example
///
/// ```rust
/// use defcache_core::{IndexConfig, IndirectIndex, InvalidationBroadcaster};
///
/// let broadcaster = InvalidationBroadcaster::shared();
/// let index = IndirectIndex::new(
///     &broadcaster,
///     IndexConfig::named("words"),
///     |word: &&str| word.chars().take(1).collect::<Vec<_>>(),
///     || Ok(vec!["apple", "avocado", "banana"]),
/// );
///
/// assert_eq!(index.get_all(&'a').unwrap().to_vec(), vec!["apple", "avocado"]);
/// assert!(index.get_all(&'z').unwrap().is_empty());
/// ```
pub struct IndirectIndex<K, R> {
    config: IndexConfig,
    extractor: Extractor<K, R>,
    source: Source<R>,
    shared: Arc<Shared>,
    /// Latest build; `None` until the first rebuild.
    built: RwLock<Option<Arc<Built<K, R>>>>,
    /// Serializes rebuilds so concurrent stale queries build once.
    rebuild_lock: Mutex<()>,
    empty: Bucket<R>,
    broadcaster: Weak<InvalidationBroadcaster>,
    subscription: SubscriptionHandle,
}

impl<K, R> IndirectIndex<K, R>
where
    K: Eq + Hash + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Creates a stale index and subscribes it to `broadcaster`.
    ///
    /// Nothing is read from `source` until the first query.
    pub fn new<E, KI, S, RI>(
        broadcaster: &Arc<InvalidationBroadcaster>,
        config: IndexConfig,
        extractor: E,
        source: S,
    ) -> Self
    where
        E: Fn(&R) -> KI + Send + Sync + 'static,
        KI: IntoIterator<Item = K>,
        S: Fn() -> CacheResult<RI> + Send + Sync + 'static,
        RI: IntoIterator<Item = R>,
    {
        let shared = Arc::new(Shared::default());
        let weak = Arc::downgrade(&shared);
        let subscription = broadcaster.subscribe(move || {
            if let Some(shared) = weak.upgrade() {
                shared.invalidate();
            }
        });

        Self {
            config,
            extractor: Box::new(move |record: &R| extractor(record).into_iter().collect()),
            source: Box::new(move || source().map(|records| records.into_iter().collect())),
            shared,
            built: RwLock::new(None),
            rebuild_lock: Mutex::new(()),
            empty: Bucket::empty(),
            broadcaster: Arc::downgrade(broadcaster),
            subscription,
        }
    }

    /// Returns every record stored under `key`, in source order.
    ///
    /// Rebuilds first if the index is stale. Unknown keys yield an empty
    /// bucket. Fails only if a needed rebuild cannot read the source, in
    /// which case the index stays stale.
    pub fn get_all(&self, key: &K) -> CacheResult<Bucket<R>> {
        let (built, hit) = self.ensure_built()?;
        self.shared.stats.record_lookup(hit);
        Ok(built
            .buckets
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.empty.clone()))
    }

    /// Returns the first candidate under `key` accepted by `predicate`.
    pub fn find_first<P>(&self, key: &K, mut predicate: P) -> CacheResult<Option<R>>
    where
        P: FnMut(&R) -> bool,
    {
        let bucket = self.get_all(key)?;
        Ok(bucket.iter().find(|record| predicate(record)).cloned())
    }

    /// Returns every candidate under `key` accepted by `predicate`.
    pub fn find_all<P>(&self, key: &K, mut predicate: P) -> CacheResult<Vec<R>>
    where
        P: FnMut(&R) -> bool,
    {
        let bucket = self.get_all(key)?;
        Ok(bucket
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect())
    }

    /// Marks the index stale. The next query rebuilds.
    pub fn invalidate(&self) {
        self.shared.invalidate();
    }

    /// Rebuilds immediately from the source accessor.
    pub fn rebuild(&self) -> CacheResult<()> {
        let _guard = self.rebuild_lock.lock();
        self.rebuild_from_source().map(|_| ())
    }

    /// Rebuilds from a pushed collection instead of the source accessor.
    pub fn reload<I>(&self, records: I)
    where
        I: IntoIterator<Item = R>,
    {
        let _guard = self.rebuild_lock.lock();
        let epoch = self.shared.current_epoch();
        let built = self.build(records.into_iter().collect(), epoch);
        *self.built.write() = Some(Arc::new(built));
    }

    /// Returns true if the map reflects the source as of the last invalidation.
    pub fn is_valid(&self) -> bool {
        self.fresh().is_some()
    }

    /// Rebuilds if stale and summarizes the resulting map.
    pub fn summary(&self) -> CacheResult<IndexSummary> {
        let (built, _) = self.ensure_built()?;
        Ok(IndexSummary {
            name: self.config.name.clone(),
            records: built.record_count,
            keys: built.buckets.len(),
            unreachable: built.unreachable,
            largest_bucket: built.buckets.values().map(|b| b.len()).max().unwrap_or(0),
        })
    }

    /// Returns the index name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the index configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Returns a snapshot of the index counters.
    pub fn stats(&self) -> IndexStatsSnapshot {
        self.shared.stats.snapshot()
    }

    fn fresh(&self) -> Option<Arc<Built<K, R>>> {
        let epoch = self.shared.current_epoch();
        self.built
            .read()
            .as_ref()
            .filter(|built| built.built_at == epoch)
            .cloned()
    }

    /// Returns the fresh map and whether it was fresh on entry.
    fn ensure_built(&self) -> CacheResult<(Arc<Built<K, R>>, bool)> {
        if let Some(built) = self.fresh() {
            return Ok((built, true));
        }

        let _guard = self.rebuild_lock.lock();
        // Another caller may have rebuilt while we waited.
        if let Some(built) = self.fresh() {
            return Ok((built, false));
        }
        self.rebuild_from_source().map(|built| (built, false))
    }

    /// Caller must hold `rebuild_lock`.
    fn rebuild_from_source(&self) -> CacheResult<Arc<Built<K, R>>> {
        // Read the epoch before the source so a concurrent invalidation
        // leaves this build stale.
        let epoch = self.shared.current_epoch();
        let records = match (self.source)() {
            Ok(records) => records,
            Err(err) => {
                self.shared.stats.record_source_failure();
                warn!(
                    index = %self.config.name,
                    error = %err,
                    "index rebuild failed; staying stale"
                );
                return Err(err);
            }
        };

        let built = Arc::new(self.build(records, epoch));
        *self.built.write() = Some(Arc::clone(&built));
        Ok(built)
    }

    fn build(&self, records: Vec<R>, built_at: u64) -> Built<K, R> {
        let started = Instant::now();
        let mut positions: HashMap<K, Vec<usize>> = HashMap::new();
        let mut unreachable = 0;

        for (position, record) in records.iter().enumerate() {
            let keys = (self.extractor)(record);
            if keys.is_empty() {
                unreachable += 1;
                if self.config.warn_on_unreachable {
                    warn!(
                        index = %self.config.name,
                        position,
                        "record yields no keys and can never be found"
                    );
                }
                continue;
            }
            for key in keys {
                let bucket = positions.entry(key).or_default();
                // Records are visited in order, so a repeated key from the
                // same record can only sit at the tail.
                if bucket.last() != Some(&position) {
                    bucket.push(position);
                }
            }
        }

        let buckets: HashMap<K, Bucket<R>> = positions
            .into_iter()
            .map(|(key, positions)| {
                let bucket: Vec<R> = positions.iter().map(|&p| records[p].clone()).collect();
                (key, Bucket::from(bucket))
            })
            .collect();

        let elapsed = started.elapsed();
        self.shared.stats.record_rebuild();
        debug!(
            index = %self.config.name,
            records = records.len(),
            keys = buckets.len(),
            unreachable,
            elapsed_us = elapsed.as_micros() as u64,
            "rebuilt index"
        );
        let threshold = self.config.slow_rebuild_threshold;
        if !threshold.is_zero() && elapsed > threshold {
            warn!(
                index = %self.config.name,
                records = records.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "slow index rebuild"
            );
        }

        Built {
            built_at,
            buckets,
            record_count: records.len(),
            unreachable,
        }
    }
}

impl<K, R> Drop for IndirectIndex<K, R> {
    fn drop(&mut self) {
        if let Some(broadcaster) = self.broadcaster.upgrade() {
            broadcaster.unsubscribe(self.subscription);
        }
    }
}

impl<K, R> fmt::Debug for IndirectIndex<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndirectIndex")
            .field("name", &self.config.name)
            .field("subscription", &self.subscription)
            .field("stats", &self.shared.stats.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq)]
    struct Rec {
        name: &'static str,
        keys: Vec<char>,
    }

    fn rec(name: &'static str, keys: &[char]) -> Rec {
        Rec {
            name,
            keys: keys.to_vec(),
        }
    }

    /// A swappable source that counts how often it is read.
    #[derive(Clone, Default)]
    struct TestSource {
        records: Arc<Mutex<Vec<Rec>>>,
        calls: Arc<AtomicUsize>,
        fail: Arc<Mutex<bool>>,
    }

    impl TestSource {
        fn with(records: Vec<Rec>) -> Self {
            let source = Self::default();
            source.set(records);
            source
        }

        fn set(&self, records: Vec<Rec>) {
            *self.records.lock() = records;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn index(&self, broadcaster: &Arc<InvalidationBroadcaster>) -> IndirectIndex<char, Rec> {
            let source = self.clone();
            IndirectIndex::new(
                broadcaster,
                IndexConfig::named("test"),
                |r: &Rec| r.keys.clone(),
                move || {
                    source.calls.fetch_add(1, Ordering::SeqCst);
                    if *source.fail.lock() {
                        return Err(CacheError::producer_unavailable("test", "offline"));
                    }
                    Ok(source.records.lock().clone())
                },
            )
        }
    }

    fn names(bucket: &Bucket<Rec>) -> Vec<&'static str> {
        bucket.iter().map(|r| r.name).collect()
    }

    #[test]
    fn starts_stale_and_builds_lazily() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("a", &['x'])]);
        let index = source.index(&broadcaster);

        assert!(!index.is_valid());
        assert_eq!(source.calls(), 0);

        index.get_all(&'x').unwrap();
        assert!(index.is_valid());
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn concrete_swap_scenario() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("A", &['X']), rec("B", &['X', 'Y'])]);
        let index = source.index(&broadcaster);

        assert_eq!(names(&index.get_all(&'X').unwrap()), vec!["A", "B"]);
        assert_eq!(names(&index.get_all(&'Y').unwrap()), vec!["B"]);
        assert!(index.get_all(&'Z').unwrap().is_empty());

        source.set(vec![rec("C", &['X'])]);
        index.invalidate();

        assert_eq!(names(&index.get_all(&'X').unwrap()), vec!["C"]);
        assert!(index.get_all(&'Y').unwrap().is_empty());
    }

    #[test]
    fn second_query_does_not_reread_source() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("a", &['x']), rec("b", &['y'])]);
        let index = source.index(&broadcaster);

        let first = index.get_all(&'x').unwrap();
        let second = index.get_all(&'x').unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
        assert_eq!(index.stats().rebuilds, 1);
        assert_eq!(index.stats().hits, 1);
    }

    #[test]
    fn broadcast_invalidates_every_index() {
        let broadcaster = InvalidationBroadcaster::shared();
        let changed = TestSource::with(vec![rec("a", &['x'])]);
        let unchanged = TestSource::with(vec![rec("b", &['x'])]);
        let first = changed.index(&broadcaster);
        let second = unchanged.index(&broadcaster);

        first.get_all(&'x').unwrap();
        second.get_all(&'x').unwrap();

        changed.set(vec![rec("c", &['x'])]);
        broadcaster.notify_all();

        assert!(!first.is_valid());
        assert!(!second.is_valid());
        assert_eq!(names(&first.get_all(&'x').unwrap()), vec!["c"]);
        assert_eq!(names(&second.get_all(&'x').unwrap()), vec!["b"]);
        assert_eq!(changed.calls(), 2);
        assert_eq!(unchanged.calls(), 2);
    }

    #[test]
    fn keyless_record_is_never_returned() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("ghost", &[]), rec("a", &['x'])]);
        let index = source.index(&broadcaster);

        for key in ['x', 'y', '\0'] {
            assert!(index.get_all(&key).unwrap().iter().all(|r| r.name != "ghost"));
        }
        let summary = index.summary().unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.unreachable, 1);
    }

    #[test]
    fn shared_key_keeps_source_order() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![
            rec("second", &['k']),
            rec("other", &['j']),
            rec("first", &['k']),
        ]);
        let index = source.index(&broadcaster);

        assert_eq!(names(&index.get_all(&'k').unwrap()), vec!["second", "first"]);
    }

    #[test]
    fn repeated_key_from_one_record_is_stored_once() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("a", &['x', 'x', 'y', 'x'])]);
        let index = source.index(&broadcaster);

        assert_eq!(names(&index.get_all(&'x').unwrap()), vec!["a"]);
    }

    #[test]
    fn source_failure_surfaces_and_stays_stale() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("a", &['x'])]);
        *source.fail.lock() = true;
        let index = source.index(&broadcaster);

        let err = index.get_all(&'x').unwrap_err();
        assert!(matches!(err, CacheError::ProducerUnavailable { .. }));
        assert!(!index.is_valid());
        assert_eq!(index.stats().source_failures, 1);

        *source.fail.lock() = false;
        assert_eq!(names(&index.get_all(&'x').unwrap()), vec!["a"]);
        assert!(index.is_valid());
    }

    #[test]
    fn failed_rebuild_does_not_serve_old_map() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("a", &['x'])]);
        let index = source.index(&broadcaster);
        index.get_all(&'x').unwrap();

        *source.fail.lock() = true;
        index.invalidate();
        assert!(index.get_all(&'x').is_err());
    }

    #[test]
    fn reload_bypasses_source() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("a", &['x'])]);
        let index = source.index(&broadcaster);

        index.reload(vec![rec("pushed", &['x'])]);

        assert!(index.is_valid());
        assert_eq!(names(&index.get_all(&'x').unwrap()), vec!["pushed"]);
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn explicit_rebuild_reads_source() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("a", &['x'])]);
        let index = source.index(&broadcaster);

        index.rebuild().unwrap();
        assert_eq!(source.calls(), 1);
        index.get_all(&'x').unwrap();
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn redundant_invalidation_is_harmless() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![rec("a", &['x'])]);
        let index = source.index(&broadcaster);

        index.invalidate();
        index.invalidate();
        broadcaster.notify_all();

        assert_eq!(names(&index.get_all(&'x').unwrap()), vec!["a"]);
        assert_eq!(source.calls(), 1);
        assert_eq!(index.stats().invalidations, 3);
    }

    #[test]
    fn invalidation_during_rebuild_leaves_index_stale() {
        let broadcaster = InvalidationBroadcaster::shared();
        let calls = Arc::new(AtomicUsize::new(0));
        let trigger = Arc::downgrade(&broadcaster);
        let counter = Arc::clone(&calls);
        let index: IndirectIndex<char, Rec> = IndirectIndex::new(
            &broadcaster,
            IndexConfig::named("racy"),
            |r: &Rec| r.keys.clone(),
            move || {
                // Simulate a reload landing while the source is being read.
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    if let Some(b) = trigger.upgrade() {
                        b.notify_all();
                    }
                }
                Ok(vec![rec("a", &['x'])])
            },
        );

        index.get_all(&'x').unwrap();
        assert!(!index.is_valid());

        index.get_all(&'x').unwrap();
        assert!(index.is_valid());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropping_index_unsubscribes() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![]);
        let index = source.index(&broadcaster);
        assert_eq!(broadcaster.subscriber_count(), 1);

        drop(index);
        assert_eq!(broadcaster.subscriber_count(), 0);
        broadcaster.notify_all();
    }

    #[test]
    fn find_helpers_apply_predicate_to_bucket() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![
            rec("small", &['x']),
            rec("large", &['x']),
            rec("larger", &['x']),
        ]);
        let index = source.index(&broadcaster);

        let first = index.find_first(&'x', |r| r.name.starts_with("large")).unwrap();
        assert_eq!(first.map(|r| r.name), Some("large"));

        let all = index.find_all(&'x', |r| r.name.starts_with("large")).unwrap();
        assert_eq!(all.len(), 2);

        assert_eq!(index.find_first(&'q', |_| true).unwrap(), None);
    }

    #[test]
    fn summary_reports_largest_bucket() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with(vec![
            rec("a", &['x', 'y']),
            rec("b", &['x']),
            rec("c", &['x']),
        ]);
        let index = source.index(&broadcaster);

        let summary = index.summary().unwrap();
        assert_eq!(summary.name, "test");
        assert_eq!(summary.keys, 2);
        assert_eq!(summary.largest_bucket, 3);

        // Summaries rebuild but are not lookups.
        assert_eq!(index.stats().rebuilds, 1);
        assert_eq!(index.stats().lookups, 0);
        index.get_all(&'x').unwrap();
        assert_eq!(index.stats().lookups, 1);
        assert_eq!(index.stats().hits, 1);
    }

    #[test]
    fn concurrent_readers_rebuild_once() {
        let broadcaster = InvalidationBroadcaster::shared();
        let source = TestSource::with((0..100).map(|_| rec("r", &['x'])).collect());
        let index = Arc::new(source.index(&broadcaster));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || index.get_all(&'x').unwrap().len())
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), 100);
        }
        assert_eq!(source.calls(), 1);
    }
}
