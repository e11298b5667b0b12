//! Win32 implementation of the toastpilot platform traits.
//!
//! Empty on other targets; the CLI reports the platform as unsupported.
#![cfg(windows)]

/// Console Ctrl+C handling.
pub mod ctrl_c;

/// Top-level window enumeration.
pub mod enumerate;

/// WinEvent hook and display-change pump threads.
pub mod event_loop;

/// Monitor enumeration.
pub mod monitor;

/// `Platform` and `EventSource` over Win32.
pub mod platform;

/// Process image names.
pub mod process;

/// OS build detection.
pub mod version;

/// Window type wrapping a Win32 `HWND`.
pub mod window;

pub use platform::{WinEventSource, WinPlatform};
pub use window::Window;
