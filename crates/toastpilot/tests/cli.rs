use std::process::Command;

#[test]
fn help_exits_successfully() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toastpilot"));
    cmd.arg("--help");

    // Act
    let output = cmd.output().expect("failed to execute toastpilot");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("notification popups"));
}

#[test]
fn version_exits_successfully() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toastpilot"));
    cmd.arg("--version");

    // Act
    let output = cmd.output().expect("failed to execute toastpilot");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("toastpilot"));
}

#[test]
fn notify_help_lists_routing_options() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toastpilot"));
    cmd.args(["notify", "--help"]);

    // Act
    let output = cmd.output().expect("failed to execute toastpilot");

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--process"));
    assert!(stdout.contains("--app"));
}

#[test]
fn notify_requires_title_and_message() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toastpilot"));
    cmd.args(["notify", "only-a-title"]);

    // Act
    let output = cmd.output().expect("failed to execute toastpilot");

    // Assert
    assert!(!output.status.success());
}

#[cfg(unix)]
#[test]
fn init_writes_config_once() {
    // Arrange
    let home = std::env::temp_dir().join(format!("toastpilot-init-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create temp home");
    let run = || {
        Command::new(env!("CARGO_BIN_EXE_toastpilot"))
            .arg("init")
            .env("HOME", &home)
            .output()
            .expect("failed to execute toastpilot")
    };

    // Act
    let first = run();
    let second = run();

    // Assert
    let config = home.join(".config").join("toastpilot").join("config.toml");
    assert!(first.status.success());
    assert!(config.exists());
    assert!(String::from_utf8_lossy(&second.stdout).contains("Already exists"));

    let _ = std::fs::remove_dir_all(&home);
}

#[cfg(not(windows))]
#[test]
fn monitors_reports_unsupported_platform() {
    // Arrange
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toastpilot"));
    cmd.arg("monitors");

    // Act
    let output = cmd.output().expect("failed to execute toastpilot");

    // Assert
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("only runs on Windows"));
}

#[cfg(unix)]
#[test]
fn run_opens_the_log_before_touching_the_platform() {
    // Arrange
    let home = std::env::temp_dir().join(format!("toastpilot-run-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&home);
    let config_dir = home.join(".config").join("toastpilot");
    std::fs::create_dir_all(&config_dir).expect("create config dir");
    std::fs::write(
        config_dir.join("config.toml"),
        "[logging]\nenabled = true\n",
    )
    .expect("write config");

    // Act
    let output = Command::new(env!("CARGO_BIN_EXE_toastpilot"))
        .arg("run")
        .env("HOME", &home)
        .output()
        .expect("failed to execute toastpilot");

    // Assert
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Logging to"));
    assert!(config_dir.join("logs").join("toastpilot.log").exists());

    let _ = std::fs::remove_dir_all(&home);
}
