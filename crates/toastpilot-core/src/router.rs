//! Per-notification target monitor selection.
//!
//! The router walks a fixed priority chain for each request and learns
//! which monitor each application lives on, both from live windows it
//! finds while routing and from window moves reported by the tracker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use serde::Serialize;

use crate::monitor::{Monitor, MonitorManager};
use crate::platform::CoreResult;
use crate::process::{UNKNOWN_PROCESS, normalize_process_name};
use crate::signal::Signal;
use crate::sync::lock;
use crate::tracker::{WindowMoved, WindowTracker};
use crate::{log_debug, log_info};

/// A notification to be placed on a monitor.
///
/// Everything except the target is fixed at construction. The target
/// is assigned at most once, either up front or by the router.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
    /// Display name of the application.
    pub app_name: String,
    /// Executable name of the application, used for routing.
    pub process_name: String,
    target: Option<Monitor>,
    pub timestamp: SystemTime,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            app_name: String::new(),
            process_name: String::new(),
            target: None,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_process_name(mut self, process_name: impl Into<String>) -> Self {
        self.process_name = process_name.into();
        self
    }

    /// Pre-assigns the target monitor; the router will not change it.
    pub fn with_target(mut self, monitor: Monitor) -> Self {
        self.target = Some(monitor);
        self
    }

    pub fn target(&self) -> Option<&Monitor> {
        self.target.as_ref()
    }

    /// Sets the target if none is assigned yet. Returns whether it was set.
    pub(crate) fn assign_target(&mut self, monitor: Monitor) -> bool {
        if self.target.is_some() {
            return false;
        }
        self.target = Some(monitor);
        true
    }
}

/// Which rule picked the target monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    /// The request arrived with a target.
    PreAssigned,
    /// A live window of the requesting process.
    LiveWindow,
    /// A previously learned mapping for the process.
    LearnedMapping,
    /// The monitor of the foreground window.
    ActiveWindow,
    /// Nothing better was known.
    Primary,
}

pub struct NotificationRouter {
    monitors: Arc<MonitorManager>,
    tracker: Arc<WindowTracker>,
    mappings: Mutex<HashMap<String, Monitor>>,
    /// Fired with every successfully routed request.
    pub routed: Signal<NotificationRequest>,
}

impl NotificationRouter {
    pub fn new(monitors: Arc<MonitorManager>, tracker: Arc<WindowTracker>) -> Self {
        Self {
            monitors,
            tracker,
            mappings: Mutex::new(HashMap::new()),
            routed: Signal::new(),
        }
    }

    /// Assigns a target monitor to the request if it has none.
    ///
    /// Priority: a live window of the request's process (which is also
    /// learned), the learned mapping, the foreground window's monitor,
    /// then the primary monitor. Fails only when no monitor is known.
    pub fn route(&self, request: &mut NotificationRequest) -> CoreResult<RouteSource> {
        let source = if request.target().is_some() {
            RouteSource::PreAssigned
        } else {
            let (monitor, source) = self
                .resolve(&request.process_name)
                .ok_or("no monitor available for routing")?;
            request.assign_target(monitor);
            source
        };

        if let Some(target) = request.target() {
            log_info!(
                "Routed \"{}\" from {} to monitor {} ({:?})",
                request.title,
                display_name(request),
                target.index,
                source
            );
        }
        self.routed.emit(request);
        Ok(source)
    }

    fn resolve(&self, process_name: &str) -> Option<(Monitor, RouteSource)> {
        if !normalize_process_name(process_name).is_empty() {
            let live = self.tracker.window_for_process(process_name);
            if let Some(monitor) = live.and_then(|w| w.monitor) {
                self.set_app_monitor(process_name, monitor);
                return Some((monitor, RouteSource::LiveWindow));
            }
            if let Some(monitor) = self.app_monitor(process_name) {
                return Some((monitor, RouteSource::LearnedMapping));
            }
        }

        if let Some(monitor) = self.tracker.current_active_window().and_then(|w| w.monitor) {
            return Some((monitor, RouteSource::ActiveWindow));
        }

        self.monitors
            .primary()
            .map(|monitor| (monitor, RouteSource::Primary))
    }

    /// Returns the learned monitor for a process.
    ///
    /// The stored monitor is matched against the current topology by
    /// handle, so mappings to unplugged monitors read as absent and
    /// geometry is always current.
    pub fn app_monitor(&self, process_name: &str) -> Option<Monitor> {
        let key = normalize_process_name(process_name);
        let mapped = lock(&self.mappings).get(&key).copied()?;
        self.monitors
            .all_monitors()
            .into_iter()
            .find(|m| m.handle == mapped.handle)
    }

    pub fn set_app_monitor(&self, process_name: &str, monitor: Monitor) {
        let key = normalize_process_name(process_name);
        if key.is_empty() {
            return;
        }
        let previous = lock(&self.mappings).insert(key.clone(), monitor);
        if previous.map(|m| m.handle) != Some(monitor.handle) {
            log_debug!("Learned {key} -> monitor {}", monitor.index);
        }
    }

    /// Forgets the mapping for one process. Returns whether one existed.
    pub fn clear_app_monitor(&self, process_name: &str) -> bool {
        let key = normalize_process_name(process_name);
        lock(&self.mappings).remove(&key).is_some()
    }

    pub fn clear_all(&self) {
        lock(&self.mappings).clear();
    }

    /// Returns a copy of every learned mapping, sorted by process name.
    pub fn mappings(&self) -> Vec<(String, Monitor)> {
        let mut all: Vec<(String, Monitor)> = lock(&self.mappings)
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Learning hook for the tracker's `moved` signal.
    pub fn learn_from_move(&self, moved: &WindowMoved) {
        let name = &moved.window.process_name;
        if name.is_empty() || name == UNKNOWN_PROCESS {
            return;
        }
        self.set_app_monitor(name, moved.to);
    }
}

fn display_name(request: &NotificationRequest) -> &str {
    if !request.app_name.is_empty() {
        &request.app_name
    } else if !request.process_name.is_empty() {
        &request.process_name
    } else {
        "unknown app"
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
