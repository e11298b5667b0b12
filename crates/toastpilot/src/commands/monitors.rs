use super::describe_monitor;

/// Prints the connected monitors.
pub fn execute(json: bool) {
    let orchestrator = super::orchestrator(&toastpilot_core::config::load());
    let monitors = orchestrator.list_monitors();

    if json {
        super::print_json(&monitors);
        return;
    }

    if monitors.is_empty() {
        println!("No monitors found.");
        return;
    }
    for monitor in &monitors {
        let w = monitor.work_area;
        println!(
            "{}  work area ({},{} {}x{})",
            describe_monitor(monitor),
            w.x,
            w.y,
            w.width,
            w.height
        );
    }
}
