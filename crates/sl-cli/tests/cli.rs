//! CLI command integration tests.
//! Each test writes its inputs into a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sl_cmd() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("sl").unwrap();
    cmd.env_remove("SL_CONFIG");
    cmd
}

/// Three days of reacted calls, one each way per day.
fn balanced_log() -> String {
    let mut events = Vec::new();
    for day in 1..=3 {
        for (from, to, minute) in [("a", "b", 0), ("b", "a", 5)] {
            events.push(serde_json::json!({
                "sender": from,
                "receiver": to,
                "timestamp": format!("2024-03-0{day}T10:{minute:02}:00Z"),
                "type": "call",
                "reactions": ["❤"],
            }));
        }
    }
    serde_json::to_string(&events).unwrap()
}

fn write_log(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn config_prints_defaults() {
    sl_cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[classifier]"))
        .stdout(predicate::str::contains("length_tolerance = 1.1"))
        .stdout(predicate::str::contains("synchronized_threshold = 0.6"));
}

#[test]
fn analyze_prints_report() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, "pair.json", &balanced_log());

    sl_cmd()
        .arg("analyze")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("NETWORK TOPOLOGY REPORT"))
        .stdout(predicate::str::contains("Nodes:            2"))
        .stdout(predicate::str::contains("CONNECTION: a ↔ b"))
        .stdout(predicate::str::contains("PHASE STATE:      [ ENTANGLED ]"))
        .stdout(predicate::str::contains("Fingerprint:      sync_"))
        .stdout(predicate::str::contains("Artifact detected"));
}

#[test]
fn analyze_json_output() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, "pair.json", &balanced_log());

    let output = sl_cmd().args(["analyze", "--json"]).arg(&log).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["network_metrics"]["total_agents"], 2);
    assert_eq!(report["network_metrics"]["synchronized_pairs"], 1);
    assert_eq!(report["total_events"], 6);
    assert_eq!(report["clusters"][0]["agents"], serde_json::json!(["a", "b"]));
}

#[test]
fn analyze_accepts_wrapped_document() {
    let dir = TempDir::new().unwrap();
    let wrapped = format!("{{\"events\": {}}}", balanced_log());
    let log = write_log(&dir, "wrapped.json", &wrapped);

    sl_cmd()
        .arg("analyze")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Edges (Pairs):    1"));
}

#[test]
fn analyze_skips_unreadable_files() {
    let dir = TempDir::new().unwrap();
    let good = write_log(&dir, "good.json", &balanced_log());
    let broken = write_log(&dir, "broken.json", "[{\"sender\": ");
    let missing = dir.path().join("missing.json");

    sl_cmd()
        .arg("analyze")
        .arg(&missing)
        .arg(&broken)
        .arg(&good)
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping"))
        .stdout(predicate::str::contains("CONNECTION: a ↔ b"));
}

#[test]
fn analyze_fails_when_nothing_readable() {
    let dir = TempDir::new().unwrap();
    sl_cmd()
        .arg("analyze")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no readable event logs"));
}

#[test]
fn analyze_reports_rejected_records() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        "mixed.json",
        r#"[
            {"sender": "a", "receiver": "b", "timestamp": "2024-03-01T10:00:00Z"},
            {"sender": "a", "receiver": "a", "timestamp": "2024-03-01T10:01:00Z"}
        ]"#,
    );
    sl_cmd()
        .arg("analyze")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected 1 of 2 records"))
        .stdout(predicate::str::contains("STATUS: INSUFFICIENT DATA"));
}

#[test]
fn adaptive_flag_widens_tolerance() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, "pair.json", &balanced_log());

    sl_cmd()
        .args(["analyze", "--adaptive"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("length tolerance 1.70"));
}

#[test]
fn config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, "pair.json", &balanced_log());
    let config = write_log(&dir, "sl.toml", "[classifier]\nlength_tolerance = 2.5\n");

    sl_cmd()
        .arg("analyze")
        .arg(&log)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("length tolerance 2.50"));
}

#[test]
fn invalid_config_from_env_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_log(&dir, "bad.toml", "[network]\nsynchronized_threshold = 3.0\n");

    sl_cmd()
        .env("SL_CONFIG", &config)
        .args(["demo", "--scenario", "triad"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn demo_single_scenario() {
    sl_cmd()
        .args(["demo", "--scenario", "high-sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RUNNING: HIGH SYNC"))
        .stdout(predicate::str::contains("CONNECTION: alice ↔ bob"))
        .stdout(predicate::str::contains("RUNNING: LOW SYNC").not());
}

#[test]
fn demo_runs_all_scenarios_deterministically() {
    let run = || {
        sl_cmd()
            .args(["demo", "--seed", "7"])
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    let stdout = String::from_utf8_lossy(&first.stdout);
    for name in ["LOW SYNC", "HIGH SYNC", "TRIAD"] {
        assert!(stdout.contains(&format!("RUNNING: {name}")), "missing {name}");
    }
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn missing_required_args() {
    sl_cmd().arg("analyze").assert().failure();
    sl_cmd()
        .args(["demo", "--scenario", "quartet"])
        .assert()
        .failure();
}
