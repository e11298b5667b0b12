use std::sync::Arc;

use crate::Rect;
use crate::event::RawEvent;

/// A boxed error type for platform and engine operations.
///
/// Platform calls fail for many unrelated reasons (window closed,
/// access denied, process exited). Callers rarely branch on the cause,
/// they log it and fall back, so a boxed error is enough.
pub type CoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Raw platform window handle (an `HWND` on Windows).
pub type WindowHandle = usize;

/// A monitor as reported by the OS, before indices are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
    pub handle: usize,
    pub bounds: Rect,
    pub work_area: Rect,
    pub primary: bool,
}

/// Windows release family, which decides how notification popups look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsGeneration {
    /// Windows 10 and earlier.
    Legacy,
    /// Windows 11 (build 22000 and later).
    Modern,
}

impl OsGeneration {
    /// First Windows build number of the modern generation.
    pub const MODERN_MIN_BUILD: u32 = 22000;

    pub fn from_build(build: u32) -> Self {
        if build >= Self::MODERN_MIN_BUILD {
            Self::Modern
        } else {
            Self::Legacy
        }
    }
}

/// Synchronous OS queries and commands the engine depends on.
///
/// Each platform crate (e.g. `toastpilot-windows`) provides its own
/// implementation. Tests use an in-memory fake.
pub trait Platform: Send + Sync {
    // -- monitors --

    /// Lists every monitor in OS enumeration order.
    fn enumerate_monitors(&self) -> CoreResult<Vec<MonitorInfo>>;

    // -- windows --

    /// Returns the window holding input focus, if any.
    fn foreground_window(&self) -> Option<WindowHandle>;

    /// Returns visible top-level application windows.
    fn top_level_windows(&self) -> Vec<WindowHandle>;

    /// Whether the handle still identifies a live window.
    fn is_window(&self, hwnd: WindowHandle) -> bool;

    /// Whether the window is minimized.
    fn is_iconic(&self, hwnd: WindowHandle) -> bool;

    fn window_rect(&self, hwnd: WindowHandle) -> CoreResult<Rect>;

    fn window_title(&self, hwnd: WindowHandle) -> CoreResult<String>;

    fn window_class(&self, hwnd: WindowHandle) -> CoreResult<String>;

    fn window_process_id(&self, hwnd: WindowHandle) -> CoreResult<u32>;

    /// Moves a window without resizing, restacking, or activating it.
    fn move_window(&self, hwnd: WindowHandle, x: i32, y: i32) -> CoreResult<()>;

    // -- processes --

    /// Returns the executable name for a process id. Fails if the
    /// process has already exited.
    fn process_name(&self, pid: u32) -> CoreResult<String>;

    // -- system --

    fn os_generation(&self) -> OsGeneration;
}

/// Callback receiving raw window events from the OS hook.
pub type EventSink = Arc<dyn Fn(RawEvent) + Send + Sync>;

/// Callback fired when the display configuration changes.
pub type DisplaySink = Arc<dyn Fn() + Send + Sync>;

/// An active OS subscription. Dropping it without calling
/// [`Subscription::unsubscribe`] leaves the subscription installed.
pub trait Subscription: Send {
    /// Removes the subscription. Once this returns, no further
    /// callbacks are delivered.
    fn unsubscribe(self: Box<Self>);
}

/// OS event streams the engine subscribes to.
pub trait EventSource: Send + Sync {
    /// Registers one system-wide listener for window events whose codes
    /// fall in `min..=max`.
    fn subscribe_window_events(
        &self,
        min: u32,
        max: u32,
        sink: EventSink,
    ) -> CoreResult<Box<dyn Subscription>>;

    /// Registers for display topology changes.
    fn subscribe_display_changes(&self, sink: DisplaySink) -> CoreResult<Box<dyn Subscription>>;
}
