use toastpilot_core::{
    CoreResult, DisplaySink, EventSink, EventSource, MonitorInfo, OsGeneration, Platform, Rect,
    Subscription, WindowHandle,
};
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};
use windows::Win32::UI::WindowsAndMessaging::GetForegroundWindow;

use crate::window::Window;
use crate::{enumerate, event_loop, monitor, process, version};

/// Live Win32 implementation of [`Platform`].
pub struct WinPlatform {
    generation: OsGeneration,
}

impl WinPlatform {
    /// Declares per-monitor DPI awareness (V2) and detects the OS build.
    ///
    /// Without DPI awareness Windows scales coordinates by the primary
    /// monitor's DPI, which puts popups in the wrong place on mixed-DPI
    /// setups. Create it once, before any other Win32 call.
    pub fn new() -> Self {
        // SAFETY: fails harmlessly if awareness was already set, e.g. by
        // a manifest.
        unsafe {
            let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
        }
        Self {
            generation: version::os_generation(),
        }
    }
}

impl Default for WinPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for WinPlatform {
    fn enumerate_monitors(&self) -> CoreResult<Vec<MonitorInfo>> {
        monitor::enumerate_monitors()
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        // SAFETY: simple query; a null handle means no foreground window.
        let hwnd = unsafe { GetForegroundWindow() };
        (!hwnd.is_invalid()).then(|| hwnd.0 as usize)
    }

    fn top_level_windows(&self) -> Vec<WindowHandle> {
        enumerate::enumerate_windows()
    }

    fn is_window(&self, hwnd: WindowHandle) -> bool {
        Window::from_raw(hwnd).is_alive()
    }

    fn is_iconic(&self, hwnd: WindowHandle) -> bool {
        Window::from_raw(hwnd).is_iconic()
    }

    fn window_rect(&self, hwnd: WindowHandle) -> CoreResult<Rect> {
        Window::from_raw(hwnd).rect()
    }

    fn window_title(&self, hwnd: WindowHandle) -> CoreResult<String> {
        Window::from_raw(hwnd).title()
    }

    fn window_class(&self, hwnd: WindowHandle) -> CoreResult<String> {
        Window::from_raw(hwnd).class()
    }

    fn window_process_id(&self, hwnd: WindowHandle) -> CoreResult<u32> {
        Window::from_raw(hwnd).process_id()
    }

    fn move_window(&self, hwnd: WindowHandle, x: i32, y: i32) -> CoreResult<()> {
        Window::from_raw(hwnd).move_to(x, y)
    }

    fn process_name(&self, pid: u32) -> CoreResult<String> {
        process::image_name(pid)
    }

    fn os_generation(&self) -> OsGeneration {
        self.generation
    }
}

/// Win32 event subscriptions, each served by its own pump thread.
#[derive(Debug, Default)]
pub struct WinEventSource;

impl EventSource for WinEventSource {
    fn subscribe_window_events(
        &self,
        min: u32,
        max: u32,
        sink: EventSink,
    ) -> CoreResult<Box<dyn Subscription>> {
        let pump = event_loop::watch_window_events(min, max, sink)?;
        Ok(Box::new(pump))
    }

    fn subscribe_display_changes(&self, sink: DisplaySink) -> CoreResult<Box<dyn Subscription>> {
        let pump = event_loop::watch_display_changes(sink)?;
        Ok(Box::new(pump))
    }
}
