use clap::Args;

use super::describe_monitor;

#[derive(Args)]
pub struct NotifyArgs {
    /// Notification title
    pub title: String,
    /// Notification body
    pub message: String,
    /// Display name of the sending application
    #[arg(long)]
    pub app: Option<String>,
    /// Executable name used to pick the monitor, e.g. "Teams.exe"
    #[arg(long)]
    pub process: Option<String>,
    /// Print the routed request as JSON
    #[arg(long)]
    pub json: bool,
}

/// Routes a notification against the current windows and prints the
/// chosen monitor. Nothing is displayed on screen.
pub fn execute(args: &NotifyArgs) {
    let orchestrator = super::orchestrator(&toastpilot_core::config::load());
    orchestrator.scan_windows();

    let request = match orchestrator.submit_notification(
        &args.title,
        &args.message,
        args.app.as_deref(),
        args.process.as_deref(),
    ) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: could not route notification: {e}");
            std::process::exit(1);
        }
    };

    if args.json {
        super::print_json(&request);
        return;
    }

    match request.target() {
        Some(monitor) => println!("\"{}\" -> {}", request.title, describe_monitor(monitor)),
        None => println!("\"{}\" -> no monitor", request.title),
    }
}
