//! Composition root.
//!
//! Builds the components in dependency order, connects the tracker's
//! move reports to the router's learning hook, and exposes the
//! operations a host application needs. One instance is meant to be
//! shared (`Arc<Orchestrator>`) by the background service and by every
//! query the host makes.

use std::sync::{Arc, Mutex};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::hook::{HookState, HookStatsSnapshot, WindowHookEngine};
use crate::monitor::{Monitor, MonitorManager};
use crate::platform::{CoreResult, EventSource, OsGeneration, Platform};
use crate::process::ProcessNameCache;
use crate::router::{NotificationRequest, NotificationRouter};
use crate::signal::{Signal, SubscriberId};
use crate::sync::lock;
use crate::tracker::{TrackedWindow, WindowMoved, WindowTracker};
use crate::{log_info, log_warn};

pub struct Orchestrator {
    monitors: Arc<MonitorManager>,
    tracker: Arc<WindowTracker>,
    router: Arc<NotificationRouter>,
    hook: WindowHookEngine,
    received: Arc<Signal<NotificationRequest>>,
    generation: OsGeneration,
    running: Mutex<bool>,
}

impl Orchestrator {
    pub fn new(
        platform: Arc<dyn Platform>,
        events: Arc<dyn EventSource>,
        config: &Config,
    ) -> Arc<Self> {
        Self::with_clock(platform, events, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        platform: Arc<dyn Platform>,
        events: Arc<dyn EventSource>,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let generation = config
            .hook
            .os_generation
            .resolve(|| platform.os_generation());

        let monitors = Arc::new(MonitorManager::new(platform.clone(), events.clone()));
        let processes = Arc::new(ProcessNameCache::new(
            config.cache_timings(),
            clock.clone(),
        ));
        let tracker = Arc::new(WindowTracker::new(
            platform.clone(),
            monitors.clone(),
            processes.clone(),
            clock.clone(),
            config.poll_interval(),
        ));
        let router = Arc::new(NotificationRouter::new(monitors.clone(), tracker.clone()));
        let received = Arc::new(Signal::new());
        let hook = WindowHookEngine::new(
            platform,
            events,
            monitors.clone(),
            tracker.clone(),
            processes,
            clock,
            config.hook_settings(generation),
            received.clone(),
        );

        let learner = Arc::downgrade(&router);
        tracker.moved.subscribe(move |moved: &WindowMoved| {
            if let Some(router) = learner.upgrade() {
                router.learn_from_move(moved);
            }
        });

        monitors.refresh();

        Arc::new(Self {
            monitors,
            tracker,
            router,
            hook,
            received,
            generation,
            running: Mutex::new(false),
        })
    }

    /// Installs the window hook, then starts display watching and
    /// window polling.
    ///
    /// Returns `false` if the hook could not be installed; nothing is
    /// left running in that case. Calling it again while running is a
    /// no-op that returns `true`.
    pub fn start(&self) -> bool {
        let mut running = lock(&self.running);
        if *running {
            return true;
        }

        self.monitors.refresh();
        if !self.hook.start() {
            return false;
        }
        if !self.monitors.start_watching() {
            log_warn!("Monitor changes will not be picked up until restart");
        }
        let tracked = self.tracker.scan();
        self.tracker.start();

        *running = true;
        log_info!(
            "toastpilot started: {} monitors, {} windows, {:?} OS generation",
            self.monitors.all_monitors().len(),
            tracked,
            self.generation
        );
        true
    }

    /// Stops the hook, the poll thread and display watching. Safe to
    /// call repeatedly and from any thread.
    pub fn stop(&self) {
        {
            let mut running = lock(&self.running);
            if !*running {
                return;
            }
            *running = false;
        }
        self.hook.stop();
        self.tracker.stop();
        self.monitors.stop_watching();
        log_info!("toastpilot stopped");
    }

    pub fn is_running(&self) -> bool {
        *lock(&self.running)
    }

    /// Routes a notification built from its parts and returns it with
    /// its target monitor assigned.
    pub fn submit_notification(
        &self,
        title: &str,
        message: &str,
        app_name: Option<&str>,
        process_name: Option<&str>,
    ) -> CoreResult<NotificationRequest> {
        let mut request = NotificationRequest::new(title, message);
        if let Some(app_name) = app_name {
            request = request.with_app_name(app_name);
        }
        if let Some(process_name) = process_name {
            request = request.with_process_name(process_name);
        }
        self.submit_request(request)
    }

    /// Routes a pre-built request. A target already set on it is kept.
    pub fn submit_request(&self, mut request: NotificationRequest) -> CoreResult<NotificationRequest> {
        self.router.route(&mut request)?;
        Ok(request)
    }

    pub fn list_monitors(&self) -> Vec<Monitor> {
        self.monitors.all_monitors()
    }

    pub fn list_tracked_windows(&self) -> Vec<TrackedWindow> {
        self.tracker.all_tracked_windows()
    }

    /// Tracks every visible top-level window without waiting for a poll.
    pub fn scan_windows(&self) -> usize {
        self.tracker.scan()
    }

    pub fn app_monitor(&self, process_name: &str) -> Option<Monitor> {
        self.router.app_monitor(process_name)
    }

    pub fn set_app_monitor(&self, process_name: &str, monitor: Monitor) {
        self.router.set_app_monitor(process_name, monitor);
    }

    pub fn clear_app_monitor(&self, process_name: &str) -> bool {
        self.router.clear_app_monitor(process_name)
    }

    pub fn app_mappings(&self) -> Vec<(String, Monitor)> {
        self.router.mappings()
    }

    /// Subscribes to every successfully routed request.
    pub fn on_notification_routed(
        &self,
        callback: impl Fn(&NotificationRequest) + Send + Sync + 'static,
    ) -> SubscriberId {
        self.router.routed.subscribe(callback)
    }

    /// Subscribes to notification popups detected by the window hook.
    ///
    /// Callbacks run on the hook thread and must return quickly.
    pub fn on_notification_received(
        &self,
        callback: impl Fn(&NotificationRequest) + Send + Sync + 'static,
    ) -> SubscriberId {
        self.received.subscribe(callback)
    }

    pub fn hook_state(&self) -> HookState {
        self.hook.state()
    }

    pub fn hook_stats(&self) -> HookStatsSnapshot {
        self.hook.stats()
    }

    pub fn os_generation(&self) -> OsGeneration {
        self.generation
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
