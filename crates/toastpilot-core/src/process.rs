//! TTL cache mapping process ids to executable names.
//!
//! Resolving a name costs an `OpenProcess` round trip, and the hook
//! callback asks for one on nearly every event it classifies. Names
//! are cached per pid; processes that have already exited are cached
//! as [`UNKNOWN_PROCESS`] for a shorter time so a dead pid is not
//! queried again on every event.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::platform::CoreResult;
use crate::sync::lock;
use crate::{log_debug, log_info};

/// Name cached when a process cannot be resolved.
pub const UNKNOWN_PROCESS: &str = "Unknown";

/// Cache timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTimings {
    /// How long a resolved name stays valid.
    pub ttl: Duration,
    /// How long an [`UNKNOWN_PROCESS`] entry stays valid.
    pub failure_ttl: Duration,
    /// Minimum time between sweeps of expired entries.
    pub sweep_interval: Duration,
}

impl Default for CacheTimings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            failure_ttl: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    expires_at: Instant,
}

struct Table {
    entries: HashMap<u32, Entry>,
    last_sweep: Instant,
}

/// Hit/miss counters, read by the hook engine's periodic report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate in percent, or 0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 * 100.0 / total as f64
    }
}

pub struct ProcessNameCache {
    table: Mutex<Table>,
    timings: CacheTimings,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ProcessNameCache {
    pub fn new(timings: CacheTimings, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            table: Mutex::new(Table {
                entries: HashMap::new(),
                last_sweep: now,
            }),
            timings,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached name for `pid`, calling `lookup` on a miss.
    ///
    /// Expired entries count as misses even before the sweep removes
    /// them. Lookup failures are cached as [`UNKNOWN_PROCESS`].
    ///
    /// The lock is not held while `lookup` runs, so two threads missing
    /// on the same pid at once may both resolve it.
    pub fn resolve(&self, pid: u32, lookup: impl FnOnce(u32) -> CoreResult<String>) -> String {
        let now = self.clock.now();
        {
            let mut table = lock(&self.table);
            self.sweep_if_due(&mut table, now);
            if let Some(entry) = table.entries.get(&pid)
                && entry.expires_at > now
            {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return entry.name.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let (name, ttl) = match lookup(pid) {
            Ok(name) => (name, self.timings.ttl),
            Err(e) => {
                log_debug!("Process {pid} not resolved: {e}");
                (UNKNOWN_PROCESS.to_string(), self.timings.failure_ttl)
            }
        };

        lock(&self.table).entries.insert(
            pid,
            Entry {
                name: name.clone(),
                expires_at: now + ttl,
            },
        );
        name
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: lock(&self.table).entries.len(),
        }
    }

    fn sweep_if_due(&self, table: &mut Table, now: Instant) {
        if now.duration_since(table.last_sweep) < self.timings.sweep_interval {
            return;
        }
        let before = table.entries.len();
        table.entries.retain(|_, e| e.expires_at > now);
        table.last_sweep = now;
        let removed = before - table.entries.len();
        if removed > 0 {
            log_info!("Process cache sweep removed {removed} expired entries");
        }
    }
}

/// Normalizes a process name for comparisons and map keys:
/// trimmed, lowercase, without a trailing `.exe`.
pub fn normalize_process_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}
