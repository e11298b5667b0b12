//! Window-event hook engine.
//!
//! Subscribes to system-wide window create/show/location events,
//! recognizes notification popups, and moves each one to the monitor
//! of the foreground window. Everything after [`WindowHookEngine::start`]
//! runs inside the platform callback, so the pipeline rejects noise
//! with the cheapest checks first and never lets an error escape.

pub mod classify;
pub mod placement;
mod stats;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::Clock;
use crate::event::{EVENT_OBJECT_CREATE, EVENT_OBJECT_LOCATIONCHANGE, EventKind, RawEvent};
use crate::monitor::MonitorManager;
use crate::platform::{CoreResult, EventSource, Platform, Subscription, WindowHandle};
use crate::process::ProcessNameCache;
use crate::router::NotificationRequest;
use crate::signal::Signal;
use crate::sync::lock;
use crate::tracker::WindowTracker;
use crate::{log_debug, log_error, log_info, log_warn};

pub use classify::ClassificationPolicy;
pub use placement::{DEFAULT_MARGIN, Placement};
pub use stats::HookStatsSnapshot;

use stats::HookStats;

/// Lifecycle of the hook subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Stopped,
    Starting,
    Active,
    Stopping,
}

/// Tunables for the hook engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookSettings {
    pub policy: ClassificationPolicy,
    /// Inset from the work-area corner, in pixels.
    pub margin: i32,
    /// How often the stats summary is logged.
    pub stats_interval: Duration,
}

/// Result of running one event through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Dropped by the structural or event-type filter.
    Filtered,
    /// Arrived after `stop()`.
    Inactive,
    /// Not a notification popup.
    NotNotification,
    /// A notification already on its target monitor, or with no target.
    Stayed,
    /// A notification moved to its target monitor.
    Moved,
    /// A platform call failed; the event was abandoned.
    Failed,
}

struct Control {
    state: HookState,
    subscription: Option<Box<dyn Subscription>>,
}

pub struct WindowHookEngine {
    shared: Arc<HookShared>,
    events: Arc<dyn EventSource>,
    control: Mutex<Control>,
}

/// State reachable from the platform callback.
struct HookShared {
    platform: Arc<dyn Platform>,
    monitors: Arc<MonitorManager>,
    tracker: Arc<WindowTracker>,
    processes: Arc<ProcessNameCache>,
    clock: Arc<dyn Clock>,
    settings: HookSettings,
    active: AtomicBool,
    stats: HookStats,
    received: Arc<Signal<NotificationRequest>>,
}

impl WindowHookEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        platform: Arc<dyn Platform>,
        events: Arc<dyn EventSource>,
        monitors: Arc<MonitorManager>,
        tracker: Arc<WindowTracker>,
        processes: Arc<ProcessNameCache>,
        clock: Arc<dyn Clock>,
        settings: HookSettings,
        received: Arc<Signal<NotificationRequest>>,
    ) -> Self {
        let stats = HookStats::new(settings.stats_interval, clock.now());
        Self {
            shared: Arc::new(HookShared {
                platform,
                monitors,
                tracker,
                processes,
                clock,
                settings,
                active: AtomicBool::new(false),
                stats,
                received,
            }),
            events,
            control: Mutex::new(Control {
                state: HookState::Stopped,
                subscription: None,
            }),
        }
    }

    /// Installs the window-event listener.
    ///
    /// Returns `true` if the engine is active afterwards, including when
    /// it already was. On failure the engine stays stopped; there is no
    /// automatic retry.
    pub fn start(&self) -> bool {
        let mut control = lock(&self.control);
        if control.state == HookState::Active {
            return true;
        }
        control.state = HookState::Starting;

        let shared = self.shared.clone();
        let sink = Arc::new(move |event: RawEvent| {
            shared.handle_event(event);
        });

        self.shared.active.store(true, Ordering::Release);
        match self.events.subscribe_window_events(
            EVENT_OBJECT_CREATE,
            EVENT_OBJECT_LOCATIONCHANGE,
            sink,
        ) {
            Ok(subscription) => {
                control.subscription = Some(subscription);
                control.state = HookState::Active;
                log_info!(
                    "Window hook active ({} policy, margin {})",
                    self.shared.settings.policy,
                    self.shared.settings.margin
                );
                true
            }
            Err(e) => {
                self.shared.active.store(false, Ordering::Release);
                control.state = HookState::Stopped;
                log_error!("Failed to install window hook: {e}");
                false
            }
        }
    }

    /// Removes the listener. Safe to call repeatedly; no event is
    /// processed once this returns.
    pub fn stop(&self) {
        let mut control = lock(&self.control);
        let Some(subscription) = control.subscription.take() else {
            control.state = HookState::Stopped;
            return;
        };
        control.state = HookState::Stopping;
        self.shared.active.store(false, Ordering::Release);
        subscription.unsubscribe();
        control.state = HookState::Stopped;
        log_info!("Window hook stopped");
    }

    pub fn state(&self) -> HookState {
        lock(&self.control).state
    }

    pub fn stats(&self) -> HookStatsSnapshot {
        self.shared.stats.snapshot(self.shared.processes.stats())
    }

    /// Runs one event through the pipeline, as the platform callback does.
    pub fn handle_event(&self, event: RawEvent) -> EventOutcome {
        self.shared.handle_event(event)
    }
}

impl HookShared {
    fn handle_event(&self, event: RawEvent) -> EventOutcome {
        self.stats.seen();
        let outcome = self.run_pipeline(event);
        self.stats
            .maybe_report(self.clock.now(), || self.processes.stats());
        outcome
    }

    fn run_pipeline(&self, event: RawEvent) -> EventOutcome {
        if !self.active.load(Ordering::Acquire) {
            return EventOutcome::Inactive;
        }
        if !event.targets_window() {
            self.stats.filtered();
            return EventOutcome::Filtered;
        }
        let Some(kind) = event.kind() else {
            self.stats.filtered();
            return EventOutcome::Filtered;
        };

        self.stats.processed();
        match self.process(event.hwnd, kind) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.failed();
                log_warn!("Hook event {kind} for 0x{:X} failed: {e}", event.hwnd);
                EventOutcome::Failed
            }
        }
    }

    fn process(&self, hwnd: WindowHandle, kind: EventKind) -> CoreResult<EventOutcome> {
        let policy = self.settings.policy;

        // Cheapest gate first: the process name is usually cached.
        let pid = self.platform.window_process_id(hwnd)?;
        let process = self
            .processes
            .resolve(pid, |pid| self.platform.process_name(pid));
        if !policy.allows_process(&process) {
            return Ok(EventOutcome::NotNotification);
        }

        let class = self.platform.window_class(hwnd)?;
        if !policy.allows_class(&class) {
            return Ok(EventOutcome::NotNotification);
        }

        let title = self.platform.window_title(hwnd)?;
        if !policy.is_notification_title(&title) {
            return Ok(EventOutcome::NotNotification);
        }

        self.stats.notification();
        let rect = self.platform.window_rect(hwnd)?;
        let target = self
            .tracker
            .current_active_window()
            .and_then(|w| w.monitor);
        let current = self.monitors.monitor_containing(&rect);

        // A popup raises create then show; only the show is reported.
        if kind == EventKind::Shown {
            log_debug!(
                "Notification 0x{hwnd:X} {kind}: {process} [{class}] \"{title}\" at ({},{} {}x{})",
                rect.x,
                rect.y,
                rect.width,
                rect.height
            );
            let mut request = NotificationRequest::new(title, "")
                .with_app_name(process.clone())
                .with_process_name(process);
            if let Some(target) = target {
                request = request.with_target(target);
            }
            self.received.emit(&request);
        }

        match placement::plan(&rect, current.as_ref(), target.as_ref(), self.settings.margin) {
            Placement::Stay => {
                self.stats.skipped();
                Ok(EventOutcome::Stayed)
            }
            Placement::MoveTo { x, y } => {
                if !self.active.load(Ordering::Acquire) {
                    return Ok(EventOutcome::Inactive);
                }
                self.platform.move_window(hwnd, x, y)?;
                self.stats.moved();
                log_info!(
                    "Moved notification 0x{hwnd:X} from ({},{}) to ({x},{y}) on monitor {}",
                    rect.x,
                    rect.y,
                    target.map_or(0, |m| m.index)
                );
                Ok(EventOutcome::Moved)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/hook_tests.rs"]
mod tests;
