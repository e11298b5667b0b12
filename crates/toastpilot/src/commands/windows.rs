/// Prints every visible application window and its monitor.
pub fn execute(json: bool) {
    let orchestrator = super::orchestrator(&toastpilot_core::config::load());
    orchestrator.scan_windows();

    let mut windows = orchestrator.list_tracked_windows();
    windows.sort_by(|a, b| a.process_name.cmp(&b.process_name).then(a.hwnd.cmp(&b.hwnd)));

    if json {
        super::print_json(&windows);
        return;
    }

    println!(
        "{:<12} {:<24} {:>8} {}",
        "HWND", "Process", "Monitor", "Title"
    );
    for window in &windows {
        let monitor = window
            .monitor
            .map(|m| format!("#{}", m.index))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<12} {:<24} {:>8} {}",
            format!("0x{:X}", window.hwnd),
            window.process_name,
            monitor,
            window.title
        );
    }
    println!("\n{} windows found", windows.len());
}
