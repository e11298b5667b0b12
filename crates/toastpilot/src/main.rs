mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "toastpilot",
    version,
    about = "Moves notification popups to the monitor you are working on"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default configuration file
    Init,
    /// Watch for notification popups and reposition them until Ctrl+C
    Run,
    /// List connected monitors
    Monitors {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List visible application windows and the monitor hosting each
    Windows {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Route a notification and print the monitor it would be shown on
    Notify(commands::notify::NotifyArgs),
    /// Print window events in the hook range and how each is classified
    Events,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Run => commands::run::execute(),
        Commands::Monitors { json } => commands::monitors::execute(json),
        Commands::Windows { json } => commands::windows::execute(json),
        Commands::Notify(args) => commands::notify::execute(&args),
        Commands::Events => commands::events::execute(),
    }
}
