use toastpilot_core::log;

use super::{describe_monitor, host};

/// Runs the popup router in the foreground until Ctrl+C.
pub fn execute() {
    let config = toastpilot_core::config::load();
    if let Some(path) = log::init(&config.logging) {
        println!("Logging to {}", path.display());
    }

    let orchestrator = super::orchestrator(&config);

    let shutdown = match host::shutdown_signal() {
        Ok(rx) => rx,
        Err(e) => {
            eprintln!("Error: could not install Ctrl+C handler: {e}");
            std::process::exit(1);
        }
    };

    orchestrator.on_notification_received(|request| {
        let target = request
            .target()
            .map(describe_monitor)
            .unwrap_or_else(|| "none".into());
        println!("Popup detected, target monitor {target}");
    });
    orchestrator.on_notification_routed(|request| {
        if let Some(monitor) = request.target() {
            println!(
                "Routed \"{}\" from {} to {}",
                request.title,
                display_source(&request.process_name),
                describe_monitor(monitor)
            );
        }
    });

    if !orchestrator.start() {
        eprintln!("Error: could not install the window event hook.");
        std::process::exit(1);
    }

    let monitors = orchestrator.list_monitors();
    println!(
        "toastpilot running on {} monitor(s), {:?} notification style. Press Ctrl+C to stop.",
        monitors.len(),
        orchestrator.os_generation()
    );
    for monitor in &monitors {
        println!("  {}", describe_monitor(monitor));
    }

    let _ = shutdown.recv();
    orchestrator.stop();

    let stats = orchestrator.hook_stats();
    println!(
        "\nStopped. {} events seen ({:.1}% filtered), {} popups, {} moved, {} failures.",
        stats.seen,
        stats.filter_rate(),
        stats.notifications,
        stats.moves,
        stats.failures
    );
}

fn display_source(process_name: &str) -> &str {
    if process_name.is_empty() {
        "unknown app"
    } else {
        process_name
    }
}
