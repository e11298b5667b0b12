//! Display monitor topology.
//!
//! The monitor list is rebuilt wholesale on every refresh; callers only
//! ever receive copies, so a snapshot never changes under them.

use std::sync::{Arc, Mutex, Weak};

use serde::Serialize;

use crate::platform::{EventSource, Platform, Subscription};
use crate::signal::Signal;
use crate::sync::lock;
use crate::{Rect, log_debug, log_error, log_info};

/// A display monitor with its geometry and enumeration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Monitor {
    /// Opaque platform handle (`HMONITOR` on Windows).
    pub handle: usize,
    /// Full monitor rectangle.
    pub bounds: Rect,
    /// Usable area, excluding the taskbar and docked toolbars.
    pub work_area: Rect,
    pub primary: bool,
    /// Zero-based position in the last enumeration pass.
    pub index: usize,
}

impl Monitor {
    /// Whether the monitor bounds contain the point.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.bounds.contains_point(x, y)
    }
}

pub struct MonitorManager {
    platform: Arc<dyn Platform>,
    events: Arc<dyn EventSource>,
    monitors: Mutex<Vec<Monitor>>,
    watch: Mutex<Option<Box<dyn Subscription>>>,
    /// Fired after every refresh with the new monitor list.
    pub changed: Signal<Vec<Monitor>>,
}

impl MonitorManager {
    /// Creates a manager with an empty monitor list. Call
    /// [`MonitorManager::refresh`] to populate it.
    pub fn new(platform: Arc<dyn Platform>, events: Arc<dyn EventSource>) -> Self {
        Self {
            platform,
            events,
            monitors: Mutex::new(Vec::new()),
            watch: Mutex::new(None),
            changed: Signal::new(),
        }
    }

    /// Re-enumerates monitors, assigns indices, and fires `changed`.
    ///
    /// Enumeration failure leaves an empty list, which every query
    /// reports as "no monitor known".
    pub fn refresh(&self) {
        let infos = match self.platform.enumerate_monitors() {
            Ok(infos) => infos,
            Err(e) => {
                log_error!("Monitor enumeration failed: {e}");
                Vec::new()
            }
        };

        let mut primary_seen = false;
        let monitors: Vec<Monitor> = infos
            .into_iter()
            .enumerate()
            .map(|(index, info)| {
                // Keep the first primary flag only.
                let primary = info.primary && !primary_seen;
                primary_seen |= primary;
                Monitor {
                    handle: info.handle,
                    bounds: info.bounds,
                    work_area: info.work_area,
                    primary,
                    index,
                }
            })
            .collect();

        log_info!("Monitors refreshed: {} found", monitors.len());
        for m in &monitors {
            log_debug!(
                "  [{}] 0x{:X} bounds({},{} {}x{}) work({},{} {}x{}){}",
                m.index,
                m.handle,
                m.bounds.x,
                m.bounds.y,
                m.bounds.width,
                m.bounds.height,
                m.work_area.x,
                m.work_area.y,
                m.work_area.width,
                m.work_area.height,
                if m.primary { " primary" } else { "" }
            );
        }

        *lock(&self.monitors) = monitors.clone();
        self.changed.emit(&monitors);
    }

    /// Returns a copy of the current monitor list.
    pub fn all_monitors(&self) -> Vec<Monitor> {
        lock(&self.monitors).clone()
    }

    /// Returns the primary monitor, or the first one if none is flagged.
    pub fn primary(&self) -> Option<Monitor> {
        primary_of(&lock(&self.monitors))
    }

    pub fn by_index(&self, index: usize) -> Option<Monitor> {
        lock(&self.monitors).get(index).copied()
    }

    /// Finds the monitor containing the rectangle's center point.
    ///
    /// Center containment keeps windows that straddle an edge on a
    /// single, predictable monitor. Falls back to the primary monitor.
    pub fn monitor_containing(&self, rect: &Rect) -> Option<Monitor> {
        self.monitor_from_point(rect.center_x(), rect.center_y())
    }

    /// Finds the monitor containing the point, falling back to primary.
    pub fn monitor_from_point(&self, x: i32, y: i32) -> Option<Monitor> {
        let monitors = lock(&self.monitors);
        monitors
            .iter()
            .find(|m| m.contains_point(x, y))
            .copied()
            .or_else(|| primary_of(&monitors))
    }

    /// Subscribes to OS display changes; each one triggers a refresh.
    ///
    /// Does nothing if already watching. Returns `false` if the
    /// subscription could not be installed.
    pub fn start_watching(self: &Arc<Self>) -> bool {
        let mut watch = lock(&self.watch);
        if watch.is_some() {
            return true;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let sink = Arc::new(move || {
            if let Some(manager) = weak.upgrade() {
                log_info!("Display configuration changed");
                manager.refresh();
            }
        });

        match self.events.subscribe_display_changes(sink) {
            Ok(sub) => {
                *watch = Some(sub);
                true
            }
            Err(e) => {
                log_error!("Failed to watch display changes: {e}");
                false
            }
        }
    }

    /// Removes the display-change subscription. Safe to call repeatedly.
    pub fn stop_watching(&self) {
        let sub = lock(&self.watch).take();
        if let Some(sub) = sub {
            sub.unsubscribe();
        }
    }

    pub fn is_watching(&self) -> bool {
        lock(&self.watch).is_some()
    }
}

fn primary_of(monitors: &[Monitor]) -> Option<Monitor> {
    monitors
        .iter()
        .find(|m| m.primary)
        .or_else(|| monitors.first())
        .copied()
}

#[cfg(test)]
#[path = "tests/monitor_tests.rs"]
mod tests;
