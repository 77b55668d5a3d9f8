//! Basic CLI E2E tests.
//!
//! Each test runs the binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_carshift"))
        .args(args)
        .env("CARSHIFT_DATA_DIR", data_dir)
        .env_remove("CARSHIFT_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

fn register(data_dir: &Path, id: &str, name: &str, bonus: &str) {
    run_json(data_dir, &["member", "register", id, name, bonus, "120000"]);
}

#[test]
fn test_member_register_and_show() {
    let dir = tempfile::tempdir().unwrap();
    register(dir.path(), "u1", "Alice", "2.45");

    let shown = run_json(dir.path(), &["member", "show", "u1"]);
    assert_eq!(shown["member"]["name"], "Alice");

    let list = run_json(dir.path(), &["member", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn test_member_register_out_of_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["member", "register", "u1", "Alice", "9.5", "1000"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_registration_closed() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["member", "registration", "close"]);
    let (code, _, stderr) = run_cli(dir.path(), &["member", "register", "u1", "Alice", "2.0", "1000"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("registration is closed"));
}

#[test]
fn test_schedule_submit_requires_open_board() {
    let dir = tempfile::tempdir().unwrap();
    register(dir.path(), "u1", "Alice", "2.45");
    let (code, _, _) = run_cli(
        dir.path(),
        &["schedule", "submit", "u1", "08-10", "--date", "2026-03-01", "--at", "2026-03-01T03:00"],
    );
    assert_eq!(code, 1);
}

#[test]
fn test_schedule_submit_and_show() {
    let dir = tempfile::tempdir().unwrap();
    register(dir.path(), "u1", "Alice", "2.45");
    register(dir.path(), "u2", "Bob", "3.10");
    run_json(dir.path(), &["schedule", "open"]);

    for id in ["u1", "u2"] {
        let outcome = run_json(
            dir.path(),
            &["schedule", "submit", id, "08-10", "--date", "2026-03-01", "--at", "2026-03-01T03:00"],
        );
        assert_eq!(outcome["outcome"], "accepted");
        assert_eq!(outcome["registered"], serde_json::json!([8, 9]));
    }

    let day = run_json(dir.path(), &["schedule", "show", "--date", "2026-03-01"]);
    let slots = day["slots"].as_object().unwrap();
    assert_eq!(slots.len(), 2);

    let roster = run_json(dir.path(), &["schedule", "roster", "8", "--date", "2026-03-01"]);
    assert_eq!(roster[0]["participants"].as_array().unwrap().len(), 2);

    let cancelled = run_json(dir.path(), &["schedule", "cancel", "u1", "09", "--date", "2026-03-01"]);
    assert_eq!(cancelled["cancelled"], serde_json::json!([9]));

    let tally = run_json(dir.path(), &["schedule", "tally"]);
    assert_eq!(tally.as_array().unwrap().len(), 2);
}

#[test]
fn test_schedule_closed_hour() {
    let dir = tempfile::tempdir().unwrap();
    register(dir.path(), "u1", "Alice", "2.45");
    run_json(dir.path(), &["schedule", "open"]);

    let outcome = run_json(
        dir.path(),
        &["schedule", "submit", "u1", "08", "--date", "2026-03-01", "--at", "2026-03-01T07:30"],
    );
    assert_eq!(outcome["outcome"], "all_closed");
}

#[test]
fn test_score_solve_with_values() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_json(dir.path(), &["score", "solve", "500", "--values", "100,150,250"]);
    assert_eq!(out["result"]["outcome"], "found");
    assert_eq!(out["result"]["terms"][0]["value"], 250);
    assert_eq!(out["result"]["terms"][0]["repeats"], 2);
}

#[test]
fn test_score_solve_missing_table() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["score", "solve", "500"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_plan_already_ahead() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.json");
    std::fs::write(
        &page,
        r#"{"name": "Spring", "top_100_player_rankings": [{"rank": 10, "name": "J", "score": 5000}]}"#,
    )
    .unwrap();
    let out = run_json(
        dir.path(),
        &[
            "plan",
            "find",
            "--power",
            "200000",
            "--page",
            page.to_str().unwrap(),
            "--rank",
            "10",
            "--current-ep",
            "9000",
        ],
    );
    assert_eq!(out["outcome"], "already_ahead");
}

#[test]
fn test_ranking_record_and_series() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.json");
    for (hour, score) in [(9, 1_000_000), (10, 1_050_000)] {
        std::fs::write(
            &page,
            format!(r#"{{"name": "Spring", "top_100_player_rankings": [{{"rank": 1, "name": "A", "score": {score}}}]}}"#),
        )
        .unwrap();
        let at = format!("2026-03-01T{hour:02}:15");
        let out = run_json(dir.path(), &["ranking", "record", page.to_str().unwrap(), "--at", &at]);
        assert_eq!(out["outcome"], "recorded");
    }

    let series = run_json(dir.path(), &["ranking", "series", "1"]);
    assert_eq!(series["outcome"], "series");
    assert_eq!(series["points"].as_array().unwrap().len(), 2);
}

#[test]
fn test_config_set_get() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "schedule.close_hours"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1.0");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "schedule.close_hours", "0.5"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "schedule.close_hours"]);
    assert_eq!(stdout.trim(), "0.5");

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_reward_issue_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    register(dir.path(), "u1", "Alice", "2.45");

    let (code, _, _) = run_cli(dir.path(), &["reward", "issue", "ghost", "CARD-0"]);
    assert_eq!(code, 1);

    for card in ["CARD-1", "CARD-2"] {
        run_json(dir.path(), &["reward", "issue", "u1", card, "--secret", "1234"]);
    }
    let list = run_json(dir.path(), &["reward", "list", "u1"]);
    assert_eq!(list["rewards"].as_array().unwrap().len(), 2);

    let stats = run_json(dir.path(), &["reward", "stats"]);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["top"][0]["name"], "Alice");

    let member_stats = run_json(dir.path(), &["member", "stats"]);
    assert_eq!(member_stats["rewards"], 2);
}

#[test]
fn test_schedule_reset_history() {
    let dir = tempfile::tempdir().unwrap();
    register(dir.path(), "u1", "Alice", "2.45");
    run_json(dir.path(), &["schedule", "open"]);
    for date in ["2026-03-01", "2026-03-02"] {
        run_json(
            dir.path(),
            &["schedule", "submit", "u1", "20", "--date", date, "--at", "2026-03-01T06:00"],
        );
    }

    let (code, _, _) = run_cli(dir.path(), &["schedule", "reset-history", "--keep", "2026-03-02"]);
    assert_eq!(code, 1);

    let out = run_json(
        dir.path(),
        &["schedule", "reset-history", "--keep", "2026-03-02", "--confirm"],
    );
    assert_eq!(out["cleared_days"], 1);

    let tally = run_json(dir.path(), &["schedule", "tally"]);
    assert_eq!(tally[0]["pusher_hours"], 1);
}
