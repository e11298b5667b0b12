use toastpilot_core::WindowHandle;

use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::EnumWindows;
use windows::core::BOOL;

use crate::window::Window;

/// Enumerates visible top-level application windows, minimized ones
/// included, in Z order.
pub fn enumerate_windows() -> Vec<WindowHandle> {
    let mut handles: Vec<WindowHandle> = Vec::new();

    // SAFETY: EnumWindows runs synchronously, so the Vec passed through
    // LPARAM outlives every callback invocation.
    let result = unsafe {
        EnumWindows(
            Some(enum_window_callback),
            LPARAM(&mut handles as *mut _ as isize),
        )
    };
    if let Err(e) = result {
        toastpilot_core::log_warn!("EnumWindows failed: {e}");
    }

    handles
}

/// Callback invoked by `EnumWindows` for each top-level window.
///
/// Win32 can't call Rust closures directly, so the output Vec travels
/// through the `LPARAM` user-data pointer.
unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the Vec pointer passed by enumerate_windows().
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };

    let window = Window::new(hwnd);
    if window.is_app_window() {
        handles.push(window.handle());
    }

    BOOL(1) // TRUE, continue enumerating
}
