/// Generates the default `config.toml` contents with explanatory comments.
///
/// Written by `toastpilot init` as a starter file users can edit.
pub fn generate_config() -> String {
    r##"# toastpilot configuration
# Location: ~/.config/toastpilot/config.toml

[logging]
# Enable file logging to ~/.config/toastpilot/logs/toastpilot.log.
enabled = false
# Minimum log level: "debug", "info", "warn", or "error".
level = "info"
# Maximum log file size in MB before rotation.
max_file_mb = 10

[tracker]
# How often the foreground window and tracked windows are polled, in ms.
poll_interval_ms = 500

[hook]
# Distance in pixels between a moved popup and the bottom-right corner
# of the target monitor's work area.
margin = 16
# Seconds between statistics lines in the log.
stats_interval_secs = 60
# Popup detection rules: "auto" picks from the OS build number,
# "modern" for Windows 11, "legacy" for Windows 10.
os_generation = "auto"

[cache]
# Seconds a resolved process name stays cached.
process_ttl_secs = 300
# Seconds a failed lookup ("Unknown") stays cached.
failure_ttl_secs = 10
# Seconds between sweeps of expired entries.
sweep_interval_secs = 60
"##
    .to_string()
}
