//! Runs the `ptdrain` binary against fake power supply trees.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "action,timestamp,ac,energy_total,capacity_total";

fn device(root: &Path, name: &str, attributes: &[(&str, &str)]) {
    let path = root.join(name);
    fs::create_dir_all(&path).unwrap();
    for (attr, value) in attributes {
        fs::write(path.join(attr), format!("{value}\n")).unwrap();
    }
}

fn laptop(dir: &Path) -> std::path::PathBuf {
    let root = dir.join("power_supply");
    device(&root, "BAT0", &[("energy_now", "40000000"), ("capacity", "80")]);
    device(
        &root,
        "BAT1",
        &[
            ("charge_now", "5000000"),
            ("voltage_now", "12000000"),
            ("capacity", "60"),
        ],
    );
    device(&root, "AC", &[("online", "1")]);
    root
}

fn ptdrain(root: &Path, log: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ptdrain").unwrap();
    cmd.env_remove("PTDRAIN_CONFIG")
        .arg("--root")
        .arg(root)
        .arg("--log")
        .arg(log);
    cmd
}

#[test]
fn test_records_systemd_sleep_hook() {
    let dir = TempDir::new().unwrap();
    let root = laptop(dir.path());
    let log = dir.path().join("cache").join("pt").join("drain.csv");

    ptdrain(&root, &log).args(["pre", "suspend"]).assert().success();
    ptdrain(&root, &log).args(["post", "suspend"]).assert().success();

    let content = fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], HEADER);
    assert!(lines[1].starts_with("pre,"));
    assert!(lines[1].ends_with(",1,100000000,70.00"));
    assert!(lines[2].starts_with("post,"));
    assert!(lines[2].ends_with(",1,100000000,70.00"));
}

#[test]
fn test_default_action_is_check() {
    let dir = TempDir::new().unwrap();
    let root = laptop(dir.path());
    let log = dir.path().join("drain.csv");

    ptdrain(&root, &log).assert().success();

    let content = fs::read_to_string(&log).unwrap();
    assert!(content.lines().nth(1).unwrap().starts_with("check,"));
}

#[test]
fn test_no_batteries_fails() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("power_supply");
    device(&root, "AC", &[("online", "1")]);
    let log = dir.path().join("drain.csv");

    ptdrain(&root, &log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no batteries found"));

    assert!(!log.exists());
}

#[test]
fn test_missing_root_fails() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("drain.csv");

    ptdrain(&dir.path().join("missing"), &log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unavailable"));
}

#[test]
fn test_dry_run_leaves_log_alone() {
    let dir = TempDir::new().unwrap();
    let root = laptop(dir.path());
    let log = dir.path().join("drain.csv");

    ptdrain(&root, &log)
        .args(["--dry-run", "--format", "json", "pre"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_energy\": 100000000"))
        .stdout(predicate::str::contains("\"action\": \"pre\""));

    assert!(!log.exists());
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let root = laptop(dir.path());
    let log = dir.path().join("from-config.csv");
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[paths]\npower_supply_root = {:?}\nlog_file = {:?}\n\n[record]\ndefault_action = \"manual\"\n",
            root.display().to_string(),
            log.display().to_string()
        ),
    )
    .unwrap();

    Command::cargo_bin("ptdrain")
        .unwrap()
        .env_remove("PTDRAIN_CONFIG")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let content = fs::read_to_string(&log).unwrap();
    assert!(content.lines().nth(1).unwrap().starts_with("manual,"));
}
