pub mod events;
pub mod init;
pub mod monitors;
pub mod notify;
pub mod run;
pub mod windows;

use std::sync::Arc;

use toastpilot_core::{Config, Monitor, Orchestrator};

/// Builds an orchestrator over the live platform.
///
/// Exits with an error on platforms without an implementation.
pub fn orchestrator(config: &Config) -> Arc<Orchestrator> {
    let (platform, events) = host::platform();
    Orchestrator::new(platform, events, config)
}

/// One-line description of a monitor, e.g. `#1 (1920,0 1920x1080) primary`.
pub fn describe_monitor(monitor: &Monitor) -> String {
    let b = monitor.bounds;
    let primary = if monitor.primary { " primary" } else { "" };
    format!(
        "#{} ({},{} {}x{}){primary}",
        monitor.index, b.x, b.y, b.width, b.height
    )
}

/// Pretty-prints a value as JSON on stdout.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: could not serialize output: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(windows)]
pub mod host {
    use std::sync::mpsc::{self, Receiver};
    use std::sync::Arc;

    use toastpilot_core::{CoreResult, EventSource, Platform};
    use toastpilot_windows::{WinEventSource, WinPlatform};

    pub fn platform() -> (Arc<dyn Platform>, Arc<dyn EventSource>) {
        (Arc::new(WinPlatform::new()), Arc::new(WinEventSource))
    }

    /// Returns a channel that receives `()` on Ctrl+C or console close.
    pub fn shutdown_signal() -> CoreResult<Receiver<()>> {
        let (tx, rx) = mpsc::channel();
        toastpilot_windows::ctrl_c::set_handler(tx)?;
        Ok(rx)
    }
}

#[cfg(not(windows))]
pub mod host {
    use std::sync::Arc;
    use std::sync::mpsc::Receiver;

    use toastpilot_core::{CoreResult, EventSource, Platform};

    pub fn platform() -> (Arc<dyn Platform>, Arc<dyn EventSource>) {
        eprintln!("Error: toastpilot only runs on Windows.");
        std::process::exit(1);
    }

    pub fn shutdown_signal() -> CoreResult<Receiver<()>> {
        Err("unsupported platform".into())
    }
}
