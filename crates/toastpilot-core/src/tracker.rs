//! Polling window tracker.
//!
//! Every poll cycle picks up foreground changes and re-resolves the
//! monitor of each tracked window, firing `focus_changed` and `moved`
//! signals. One mutex guards the whole tracker state, for the poll
//! cycle and for every reader; signals fire after it is released.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::clock::Clock;
use crate::monitor::{Monitor, MonitorManager};
use crate::platform::{Platform, WindowHandle};
use crate::process::{ProcessNameCache, normalize_process_name};
use crate::signal::Signal;
use crate::sync::lock;
use crate::{Rect, log_debug, log_info};

/// Default interval between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A snapshot of a window the tracker knows about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedWindow {
    pub hwnd: WindowHandle,
    pub title: String,
    pub process_id: u32,
    pub process_name: String,
    pub rect: Rect,
    /// Monitor at the time of the last update. `None` only when no
    /// monitor is known at all.
    pub monitor: Option<Monitor>,
    #[serde(skip)]
    pub last_update: Instant,
}

/// Payload of the `moved` signal.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMoved {
    pub window: TrackedWindow,
    pub from: Option<Monitor>,
    pub to: Monitor,
}

#[derive(Default)]
struct TrackerState {
    windows: HashMap<WindowHandle, TrackedWindow>,
    /// Last rectangle seen while each window was visible (not minimized).
    last_visible: HashMap<WindowHandle, Rect>,
    last_foreground: Option<WindowHandle>,
}

struct PollWorker {
    stop_tx: Sender<()>,
    handle: thread::JoinHandle<()>,
}

pub struct WindowTracker {
    platform: Arc<dyn Platform>,
    monitors: Arc<MonitorManager>,
    processes: Arc<ProcessNameCache>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    state: Mutex<TrackerState>,
    worker: Mutex<Option<PollWorker>>,
    /// Fired when the foreground window changes.
    pub focus_changed: Signal<TrackedWindow>,
    /// Fired when a tracked window lands on a different monitor.
    pub moved: Signal<WindowMoved>,
}

impl WindowTracker {
    pub fn new(
        platform: Arc<dyn Platform>,
        monitors: Arc<MonitorManager>,
        processes: Arc<ProcessNameCache>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            platform,
            monitors,
            processes,
            clock,
            poll_interval,
            state: Mutex::new(TrackerState::default()),
            worker: Mutex::new(None),
            focus_changed: Signal::new(),
            moved: Signal::new(),
        }
    }

    /// Starts the poll thread. Does nothing if it is already running.
    pub fn start(self: &Arc<Self>) {
        let mut worker = lock(&self.worker);
        if worker.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let weak: Weak<Self> = Arc::downgrade(self);
        let interval = self.poll_interval;

        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(tracker) = weak.upgrade() else {
                            break;
                        };
                        tracker.poll_once();
                    }
                    // Stop requested or the tracker was dropped.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        log_info!("Window tracker started ({} ms)", interval.as_millis());
        *worker = Some(PollWorker { stop_tx, handle });
    }

    /// Stops the poll thread and waits for it to exit. Safe to call
    /// repeatedly and from any thread, including from a signal
    /// subscriber running on the poll thread itself.
    pub fn stop(&self) {
        let Some(worker) = lock(&self.worker).take() else {
            return;
        };
        let _ = worker.stop_tx.send(());
        if worker.handle.thread().id() != thread::current().id() {
            let _ = worker.handle.join();
        }
        log_info!("Window tracker stopped");
    }

    pub fn is_running(&self) -> bool {
        lock(&self.worker).is_some()
    }

    /// Runs one poll cycle.
    pub fn poll_once(&self) {
        let mut focused = None;
        let mut moves = Vec::new();

        {
            let mut state = lock(&self.state);

            let foreground = self.platform.foreground_window();
            if foreground != state.last_foreground {
                match foreground {
                    None => state.last_foreground = None,
                    // A failed resolve leaves the focus change pending
                    // for the next cycle.
                    Some(hwnd) => {
                        if let Some(window) = self.resolve_window(hwnd, &mut state) {
                            state.last_foreground = Some(hwnd);
                            let mut record = window.clone();
                            // The sweep below compares against the
                            // monitor recorded before this cycle.
                            if let Some(previous) = state.windows.get(&hwnd) {
                                record.monitor = previous.monitor;
                            }
                            state.windows.insert(hwnd, record);
                            focused = Some(window);
                        }
                    }
                }
            }

            let handles: Vec<WindowHandle> = state.windows.keys().copied().collect();
            for hwnd in handles {
                if !self.platform.is_window(hwnd) {
                    state.windows.remove(&hwnd);
                    state.last_visible.remove(&hwnd);
                    log_debug!("Evicted closed window 0x{hwnd:X}");
                    continue;
                }

                let Some(monitor) = self.monitor_for_locked(hwnd, &mut state) else {
                    continue;
                };
                let now = self.clock.now();
                let rect = self.platform.window_rect(hwnd).ok();
                let Some(record) = state.windows.get_mut(&hwnd) else {
                    continue;
                };

                if let Some(rect) = rect
                    && !rect.is_minimized_sentinel()
                {
                    record.rect = rect;
                }
                record.last_update = now;

                if record.monitor.map(|m| m.handle) != Some(monitor.handle) {
                    let from = record.monitor.replace(monitor);
                    moves.push(WindowMoved {
                        window: record.clone(),
                        from,
                        to: monitor,
                    });
                } else {
                    // Keep geometry current after a topology refresh.
                    record.monitor = Some(monitor);
                }
            }

            let TrackerState {
                windows,
                last_visible,
                ..
            } = &mut *state;
            last_visible
                .retain(|hwnd, _| windows.contains_key(hwnd) || self.platform.is_window(*hwnd));
        }

        if let Some(window) = focused {
            log_debug!(
                "Focus changed: 0x{:X} {} ({})",
                window.hwnd,
                window.process_name,
                window.title
            );
            self.focus_changed.emit(&window);
        }
        for moved in moves {
            log_info!(
                "Window 0x{:X} ({}) moved to monitor {}",
                moved.window.hwnd,
                moved.window.process_name,
                moved.to.index
            );
            self.moved.emit(&moved);
        }
    }

    /// Adds every visible top-level window to the tracked table.
    ///
    /// Returns the number of windows now tracked. Polling keeps them
    /// current afterwards.
    pub fn scan(&self) -> usize {
        let mut state = lock(&self.state);
        for hwnd in self.platform.top_level_windows() {
            if state.windows.contains_key(&hwnd) {
                continue;
            }
            if let Some(window) = self.resolve_window(hwnd, &mut state) {
                state.windows.insert(hwnd, window);
            }
        }
        log_debug!("Scan found {} windows", state.windows.len());
        state.windows.len()
    }

    /// Resolves the current foreground window.
    pub fn current_active_window(&self) -> Option<TrackedWindow> {
        let hwnd = self.platform.foreground_window()?;
        let mut state = lock(&self.state);
        self.resolve_window(hwnd, &mut state)
    }

    /// Returns the monitor hosting the window.
    ///
    /// A minimized window resolves through the last rectangle it had
    /// while visible, or the primary monitor if it was never seen.
    pub fn monitor_for(&self, hwnd: WindowHandle) -> Option<Monitor> {
        let mut state = lock(&self.state);
        self.monitor_for_locked(hwnd, &mut state)
    }

    /// Returns the first live window owned by a process of this name.
    pub fn window_for_process(&self, process_name: &str) -> Option<TrackedWindow> {
        let wanted = normalize_process_name(process_name);
        if wanted.is_empty() {
            return None;
        }

        let hwnd = self.platform.top_level_windows().into_iter().find(|&hwnd| {
            let Ok(pid) = self.platform.window_process_id(hwnd) else {
                return false;
            };
            let name = self.process_name(pid);
            normalize_process_name(&name) == wanted
        })?;

        let mut state = lock(&self.state);
        self.resolve_window(hwnd, &mut state)
    }

    /// Returns the monitor of a window owned by the process, falling
    /// back to the primary monitor.
    pub fn monitor_for_process(&self, process_name: &str) -> Option<Monitor> {
        self.window_for_process(process_name)
            .and_then(|w| w.monitor)
            .or_else(|| self.monitors.primary())
    }

    /// Returns a copy of every tracked window.
    pub fn all_tracked_windows(&self) -> Vec<TrackedWindow> {
        let mut windows: Vec<TrackedWindow> = lock(&self.state).windows.values().cloned().collect();
        windows.sort_by_key(|w| w.hwnd);
        windows
    }

    fn process_name(&self, pid: u32) -> String {
        self.processes
            .resolve(pid, |pid| self.platform.process_name(pid))
    }

    fn resolve_window(&self, hwnd: WindowHandle, state: &mut TrackerState) -> Option<TrackedWindow> {
        let rect = self.platform.window_rect(hwnd).ok()?;
        let title = self.platform.window_title(hwnd).unwrap_or_default();
        let process_id = self.platform.window_process_id(hwnd).unwrap_or(0);
        let process_name = self.process_name(process_id);
        let monitor = self.monitor_for_locked(hwnd, state);

        Some(TrackedWindow {
            hwnd,
            title,
            process_id,
            process_name,
            rect,
            monitor,
            last_update: self.clock.now(),
        })
    }

    fn monitor_for_locked(&self, hwnd: WindowHandle, state: &mut TrackerState) -> Option<Monitor> {
        let iconic = self.platform.is_iconic(hwnd);
        match self.platform.window_rect(hwnd) {
            Ok(rect) if !iconic && !rect.is_minimized_sentinel() => {
                state.last_visible.insert(hwnd, rect);
                self.monitors.monitor_containing(&rect)
            }
            _ => state
                .last_visible
                .get(&hwnd)
                .and_then(|rect| self.monitors.monitor_containing(rect))
                .or_else(|| self.monitors.primary()),
        }
    }
}

#[cfg(test)]
#[path = "tests/tracker_tests.rs"]
mod tests;
