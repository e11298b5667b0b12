pub mod clock;
pub mod config;
pub mod event;
pub mod hook;
pub mod log;
pub mod monitor;
pub mod orchestrator;
pub mod platform;
pub mod process;
pub mod rect;
pub mod router;
pub mod signal;
mod sync;
pub mod tracker;

#[cfg(test)]
#[path = "tests/fake.rs"]
pub(crate) mod fake;

pub use config::Config;
pub use event::{EventKind, RawEvent};
pub use hook::{HookState, HookStatsSnapshot, WindowHookEngine};
pub use monitor::{Monitor, MonitorManager};
pub use orchestrator::Orchestrator;
pub use platform::{
    CoreResult, DisplaySink, EventSink, EventSource, MonitorInfo, OsGeneration, Platform,
    Subscription, WindowHandle,
};
pub use rect::Rect;
pub use router::{NotificationRequest, NotificationRouter, RouteSource};
pub use tracker::{TrackedWindow, WindowTracker};
