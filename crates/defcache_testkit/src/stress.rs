//! Stress helpers.
//!
//! Runs lookups on many threads while another thread keeps replacing the
//! registry, and checks that every bucket a reader sees comes from a
//! single generation.

use defcache_core::{IndexConfig, InvalidationBroadcaster, InvalidationCause, Registry};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress run.
#[derive(Debug, Clone)]
pub struct StressResult {
    /// Lookups performed by all readers.
    pub lookups: usize,
    /// Lookups that returned an error.
    pub failed_lookups: usize,
    /// Buckets that mixed records from different generations.
    pub torn_reads: usize,
    /// Registry replacements performed.
    pub reloads: usize,
    /// Index rebuilds performed.
    pub rebuilds: u64,
    /// Total duration.
    pub duration: Duration,
}

impl StressResult {
    /// Returns true if no lookup failed or saw a mixed bucket.
    pub fn is_clean(&self) -> bool {
        self.failed_lookups == 0 && self.torn_reads == 0
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Reader threads.
    pub readers: usize,
    /// Lookups per reader.
    pub lookups_per_reader: usize,
    /// Registry replacements performed while readers run.
    pub reloads: usize,
    /// Records per generation.
    pub records: usize,
    /// Distinct keys records are spread over.
    pub keys: u32,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            readers: 4,
            lookups_per_reader: 2_000,
            reloads: 50,
            records: 64,
            keys: 8,
        }
    }
}

#[derive(Debug)]
struct Tagged {
    generation: usize,
    key: u32,
}

fn generation(n: usize, config: &StressConfig) -> Vec<Tagged> {
    (0..config.records)
        .map(|i| Tagged {
            generation: n,
            key: i as u32 % config.keys,
        })
        .collect()
}

/// Reloads a registry while readers query an index over it.
pub fn run_reload_under_reads(config: &StressConfig) -> StressResult {
    let broadcaster = InvalidationBroadcaster::shared();
    let registry = Arc::new(Registry::new("stress", &broadcaster));
    registry.replace(generation(0, config), InvalidationCause::DataReload);
    let index = Arc::new(registry.index(IndexConfig::named("stress"), |t: &Arc<Tagged>| [t.key]));

    let done = Arc::new(AtomicBool::new(false));
    let lookups = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let torn = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    let readers: Vec<_> = (0..config.readers)
        .map(|reader| {
            let index = Arc::clone(&index);
            let lookups = Arc::clone(&lookups);
            let failed = Arc::clone(&failed);
            let torn = Arc::clone(&torn);
            let config = config.clone();
            thread::spawn(move || {
                for i in 0..config.lookups_per_reader {
                    let key = (reader + i) as u32 % config.keys;
                    lookups.fetch_add(1, Ordering::Relaxed);
                    match index.get_all(&key) {
                        Ok(bucket) => {
                            let first = bucket.first().map(|t| t.generation);
                            let mixed = bucket
                                .iter()
                                .any(|t| Some(t.generation) != first || t.key != key);
                            if mixed {
                                torn.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    let writer = {
        let registry = Arc::clone(&registry);
        let done = Arc::clone(&done);
        let config = config.clone();
        thread::spawn(move || {
            for n in 1..=config.reloads {
                registry.replace(generation(n, &config), InvalidationCause::DataReload);
                thread::yield_now();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    for reader in readers {
        reader.join().expect("reader thread panicked");
    }
    writer.join().expect("writer thread panicked");

    StressResult {
        lookups: lookups.load(Ordering::Relaxed),
        failed_lookups: failed.load(Ordering::Relaxed),
        torn_reads: torn.load(Ordering::Relaxed),
        reloads: if done.load(Ordering::SeqCst) { config.reloads } else { 0 },
        rebuilds: index.stats().rebuilds,
        duration: started.elapsed(),
    }
}
