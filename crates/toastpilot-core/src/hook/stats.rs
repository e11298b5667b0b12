use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::log_info;
use crate::process::CacheStats;

/// Running counters for the hook callback.
pub(crate) struct HookStats {
    seen: AtomicU64,
    filtered: AtomicU64,
    processed: AtomicU64,
    notifications: AtomicU64,
    moves: AtomicU64,
    skipped: AtomicU64,
    failures: AtomicU64,
    interval: Duration,
    last_report: Mutex<Instant>,
}

/// A point-in-time copy of the hook counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookStatsSnapshot {
    /// Every event delivered to the callback.
    pub seen: u64,
    /// Events dropped by the structural or event-type filter.
    pub filtered: u64,
    /// Events that reached classification.
    pub processed: u64,
    /// Events classified as notification popups.
    pub notifications: u64,
    /// Popups moved to another monitor.
    pub moves: u64,
    /// Popups left in place (already on target, or no target).
    pub skipped: u64,
    /// Events aborted by a platform error.
    pub failures: u64,
    pub cache: CacheStats,
}

impl HookStatsSnapshot {
    /// Share of seen events rejected by the cheap filters, in percent.
    pub fn filter_rate(&self) -> f64 {
        if self.seen == 0 {
            return 0.0;
        }
        self.filtered as f64 * 100.0 / self.seen as f64
    }
}

impl HookStats {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            seen: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            notifications: AtomicU64::new(0),
            moves: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            interval,
            last_report: Mutex::new(now),
        }
    }

    pub(crate) fn seen(&self) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn moved(&self) {
        self.moves.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failed(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, cache: CacheStats) -> HookStatsSnapshot {
        HookStatsSnapshot {
            seen: self.seen.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            moves: self.moves.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            cache,
        }
    }

    /// Logs a summary if the report interval has elapsed. Returns
    /// whether a report was written.
    ///
    /// Uses `try_lock` so a concurrent event never waits on reporting.
    pub(crate) fn maybe_report(&self, now: Instant, cache: impl FnOnce() -> CacheStats) -> bool {
        let Ok(mut last) = self.last_report.try_lock() else {
            return false;
        };
        if now.duration_since(*last) < self.interval {
            return false;
        }
        *last = now;
        drop(last);

        let s = self.snapshot(cache());
        log_info!(
            "Hook stats: seen={} filtered={} ({:.1}%) processed={} notifications={} moved={} skipped={} failed={} cache_hit_rate={:.1}% cache_entries={}",
            s.seen,
            s.filtered,
            s.filter_rate(),
            s.processed,
            s.notifications,
            s.moves,
            s.skipped,
            s.failures,
            s.cache.hit_rate(),
            s.cache.entries
        );
        true
    }
}
