//! Integration tests for CLI commands.

use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn write_tracking_log(dir: &Path) -> String {
    let records = [
        json!({
            "event_type": "/courses/edX/DemoX/Demo/xqueue/1/abc123def456/score_update",
            "event_source": "server",
            "username": "alice",
            "time": "2014-05-20T10:00:00+00:00",
            "context": {"course_id": "edX/DemoX/Demo", "user_id": 12345},
            "event": {"grade": 3}
        }),
        json!({
            "event_type": "problem_check",
            "event_source": "server",
            "username": "alice",
            "time": "2014-05-20T10:01:00+00:00",
            "context": {"course_id": "edX/DemoX/Demo", "user_id": 12345},
            "event": {"owner": "alice", "attempts": 2}
        }),
        json!({
            "event_type": "problem_check",
            "event_source": "server",
            "username": "bob",
            "time": "2014-05-22T10:00:00+00:00",
            "context": {"course_id": "course-v1:MITx+6.002x+2012_Fall", "user_id": 7},
            "event": {"attempts": 1}
        }),
    ];
    let path = dir.join("tracking.log");
    let mut log = records
        .iter()
        .map(|record| record.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    log.push_str("\n{broken\n");
    fs::write(&path, log).unwrap();
    path.to_string_lossy().to_string()
}

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_eventdigest"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    let success = output.status.success();

    (success, stdout, stderr)
}

#[test]
fn test_analyze_writes_one_digest_per_course() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_tracking_log(temp_dir.path());
    let out = temp_dir.path().join("out");
    let out_str = out.to_string_lossy().to_string();

    let (success, stdout, stderr) = run_cli(&[
        "analyze",
        &log,
        "--output-root",
        &out_str,
        "--exclude-context",
        "--check-user-identity",
        "--json",
    ]);
    assert!(success, "stderr: {}", stderr);

    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["read"]["malformed_lines"], 1);
    assert_eq!(summary["analysis"]["analyzed"], 3);
    assert_eq!(summary["output"]["files_written"], 2);

    let demo = fs::read_to_string(out.join("edx_demox_demo.log")).unwrap();
    assert_eq!(
        demo.lines().collect::<Vec<_>>(),
        vec![
            "event.attempts(int)|server|problem_check|1",
            "event.grade(int)|server|/courses/(course_id)/xqueue/(int1)/(block-loc)/score_update|1",
            "event.owner(username-5)|server|problem_check|1",
        ]
    );
    let mitx = fs::read_to_string(out.join("mitx_6.002x_2012_fall.log")).unwrap();
    assert_eq!(mitx, "event.attempts(int)|server|problem_check|1\n");
}

#[test]
fn test_analyze_filters_by_course_and_date() {
    let temp_dir = TempDir::new().unwrap();
    write_tracking_log(temp_dir.path());
    let out = temp_dir.path().join("out");
    let out_str = out.to_string_lossy().to_string();
    let input = temp_dir.path().to_string_lossy().to_string();

    let (success, stdout, stderr) = run_cli(&[
        "analyze",
        &input,
        "-o",
        &out_str,
        "--course",
        "edX/DemoX/Demo,course-v1:MITx+6.002x+2012_Fall",
        "--start-date",
        "2014-05-21",
        "--end-date",
        "2014-05-23",
        "--json",
    ]);
    assert!(success, "stderr: {}", stderr);

    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["analysis"]["analyzed"], 1);
    assert_eq!(summary["analysis"]["skipped"]["outside_interval"], 2);
    assert!(!out.join("edx_demox_demo.log").exists());
    assert!(out.join("mitx_6.002x_2012_fall.log").exists());
}

#[test]
fn test_analyze_rejects_contradictory_flags() {
    let temp_dir = TempDir::new().unwrap();
    let log = write_tracking_log(temp_dir.path());
    let out = temp_dir.path().join("out");
    let out_str = out.to_string_lossy().to_string();

    let (success, _, stderr) = run_cli(&[
        "analyze",
        &log,
        "-o",
        &out_str,
        "--exclude-implicit",
        "--exclude-explicit",
    ]);
    assert!(!success);
    assert!(stderr.contains("Error"));
    assert!(!out.exists());

    let (success, _, stderr) = run_cli(&[
        "analyze",
        &log,
        "-o",
        &out_str,
        "--identity-directory",
        "auth_user.tsv",
    ]);
    assert!(!success);
    assert!(stderr.contains("--check-user-identity"));
}

#[test]
fn test_event_type_command() {
    let (success, stdout, _) = run_cli(&[
        "event-type",
        "/courses/edX/DemoX/Demo/jump_to_id/8f3a1c",
    ]);
    assert!(success);
    assert_eq!(stdout.trim(), "/courses/(course_id)/jump_to_id/(block-id)");

    let (success, stdout, _) = run_cli(&[
        "event-type",
        "/courses/edX/DemoX/Demo/info/extra",
        "--exclude-known-noise",
        "--json",
    ]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["signature"].is_null());
    assert_eq!(parsed["excluded"], "trailing_segments");

    let (success, stdout, _) = run_cli(&[
        "event-type",
        "/courses/edX/DemoX/Demo/submission_history/alice/x",
        "--username",
        "alice",
        "--disable-slugging",
    ]);
    assert!(success);
    assert_eq!(
        stdout.trim(),
        "/courses/(course_id)/submission_history/(username-5)/x"
    );
}

#[test]
fn test_keys_command() {
    let temp_dir = TempDir::new().unwrap();
    let record = temp_dir.path().join("record.json");
    fs::write(
        &record,
        json!({
            "event_type": "problem_check",
            "username": "alice",
            "context": {"user_id": 12345},
            "event": {"answers": {}, "POST": {"a": 1}, "submitted_by": "alice"}
        })
        .to_string(),
    )
    .unwrap();
    let record = record.to_string_lossy().to_string();

    let (success, stdout, _) = run_cli(&["keys", &record, "--check-user-identity"]);
    assert!(success);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            "event.POST(TRIMMED)",
            "event.answers(emptydict)",
            "event.submitted_by(username-5)",
            "context.user_id(user-id)",
        ]
    );

    let (success, stdout, _) = run_cli(&["keys", &record, "--exclude-context", "--json"]);
    assert!(success);
    let keys: Vec<String> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        keys,
        vec![
            "event.POST(TRIMMED)",
            "event.answers(emptydict)",
            "event.submitted_by(string)",
        ]
    );
}

#[test]
fn test_keys_rejects_invalid_json() {
    let temp_dir = TempDir::new().unwrap();
    let record = temp_dir.path().join("record.json");
    fs::write(&record, "[1, 2]").unwrap();

    let (success, _, stderr) = run_cli(&["keys", &record.to_string_lossy()]);
    assert!(!success);
    assert!(stderr.contains("Invalid record"));
}
