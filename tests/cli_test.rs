use std::fs;
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

fn gs_sync(dir: &TempDir, args: &[&str], log_dir: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gs_sync"));
    cmd.current_dir(dir.path()).args(args).env_remove("RUST_LOG");
    for var in ["GS_SPREADSHEET_ID", "GS_SHEET_NAME", "GS_SHEETS_BASE_URL", "GS_OUTPUT_FILE", "GS_LOG_DIR"] {
        cmd.env_remove(var);
    }
    if let Some(log_dir) = log_dir {
        cmd.env("GS_LOG_DIR", log_dir);
    }
    cmd.output().expect("failed to run gs_sync")
}

#[test]
fn test_config_failure_is_logged_and_exits_non_zero() {
    let dir = tempdir().unwrap();
    let out = gs_sync(&dir, &["sync", "--config", "nao-existe.toml"], None);

    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stdout.contains("Configuration failed"), "stdout: {}", stdout);
    assert!(stderr.contains("❌"), "stderr: {}", stderr);
}

#[test]
fn test_unusable_log_dir_exits_without_panic() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let log_dir = blocker.join("logs");

    let out = gs_sync(&dir, &["sync", "--input", "nao-existe.csv"], log_dir.to_str());

    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(!stderr.contains("panicked"), "stderr: {}", stderr);
    assert!(stdout.contains("Logging setup failed"), "stdout: {}", stdout);
    assert!(stderr.contains("log directory"), "stderr: {}", stderr);
}

#[test]
fn test_run_failure_banner_goes_to_stderr() {
    let dir = tempdir().unwrap();
    let out = gs_sync(&dir, &["sync", "--input", "nao-existe.csv", "--output", "out.json"], None);

    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("❌ Run failed"), "stderr: {}", stderr);
    assert!(!stdout.contains("❌"), "stdout: {}", stdout);
    assert!(!dir.path().join("out.json").exists());
}
