use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use toastpilot_core::event::{EVENT_OBJECT_CREATE, EVENT_OBJECT_LOCATIONCHANGE};
use toastpilot_core::hook::ClassificationPolicy;
use toastpilot_core::{Platform, RawEvent};

use super::host;

/// Prints window events in real time with the verdict the hook would
/// reach for each. Press Ctrl+C to stop.
pub fn execute() {
    let config = toastpilot_core::config::load();
    let (platform, events) = host::platform();
    let generation = config
        .hook
        .os_generation
        .resolve(|| platform.os_generation());
    let policy = ClassificationPolicy::for_generation(generation);

    let stop_rx = match host::shutdown_signal() {
        Ok(rx) => rx,
        Err(e) => {
            eprintln!("Error: could not install Ctrl+C handler: {e}");
            std::process::exit(1);
        }
    };

    let (tx, rx) = mpsc::channel::<RawEvent>();
    let sink = Arc::new(move |event: RawEvent| {
        let _ = tx.send(event);
    });
    let subscription =
        match events.subscribe_window_events(EVENT_OBJECT_CREATE, EVENT_OBJECT_LOCATIONCHANGE, sink)
        {
            Ok(subscription) => subscription,
            Err(e) => {
                eprintln!("Failed to install window event hook: {e}");
                std::process::exit(1);
            }
        };

    println!("Watching window events with {policy} rules (press Ctrl+C to stop)...\n");

    loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }

        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => print_event(platform.as_ref(), policy, &event),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    subscription.unsubscribe();
}

fn print_event(platform: &dyn Platform, policy: ClassificationPolicy, event: &RawEvent) {
    let Some(kind) = event.kind() else {
        return;
    };
    if !event.targets_window() {
        return;
    }

    let process = platform
        .window_process_id(event.hwnd)
        .and_then(|pid| platform.process_name(pid))
        .unwrap_or_default();
    let class = platform.window_class(event.hwnd).unwrap_or_default();
    let title = platform.window_title(event.hwnd).unwrap_or_default();
    let verdict = if policy.is_notification(&process, &class, &title) {
        "NOTIFICATION"
    } else {
        "-"
    };

    println!(
        "{kind:<17} 0x{:<10X} {process:<24} {class:<32} \"{title}\" {verdict}",
        event.hwnd
    );
}
