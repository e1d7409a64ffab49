use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

fn run_analyze(temp: &Path) -> Output {
    let home_dir = temp.join("home");
    let cwd = temp.join("cwd");
    std::fs::create_dir_all(&home_dir).expect("home dir should be creatable");
    std::fs::create_dir_all(&cwd).expect("cwd dir should be creatable");

    Command::new(env!("CARGO_BIN_EXE_chatlens"))
        .args(["--home-dir"])
        .arg(&home_dir)
        .args(["--cwd"])
        .arg(&cwd)
        .args(["--data-dir"])
        .arg(temp.join("data"))
        .args(["--out-dir"])
        .arg(temp.join("out"))
        .output()
        .expect("chatlens should execute")
}

fn write_data_file(temp: &Path, name: &str, content: &str) {
    let data_dir = temp.join("data");
    std::fs::create_dir_all(&data_dir).expect("data dir should be creatable");
    std::fs::write(data_dir.join(name), content).expect("data file should be writable");
}

#[test]
fn full_run_prints_stages_charts_and_report() {
    let temp = unique_temp_dir("chatlens-progress-full");
    write_data_file(
        &temp,
        "single_session.json",
        include_str!("../../../fixtures/chat_history/single_session.json"),
    );
    write_data_file(
        &temp,
        "multi_session.json",
        include_str!("../../../fixtures/chat_history/multi_session.json"),
    );
    write_data_file(
        &temp,
        "malformed.json",
        include_str!("../../../fixtures/chat_history/malformed.json"),
    );

    let output = run_analyze(&temp);

    assert!(output.status.success(), "analyze should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("chatlens: starting `analyze`"));
    assert!(stdout.contains("analyze: start"));
    assert!(stdout.contains("analyze: stage load files=3"));
    assert!(stdout.contains("analyze: load_error file=malformed.json"));
    assert!(stdout.contains("analyze: checkpoint load_complete loaded=2 failed=1"));
    assert!(stdout.contains("analyze: stage build_table"));
    assert!(stdout.contains("analyze: checkpoint table_built rows=8 files=2"));
    assert!(stdout.contains("analyze: stage generate_charts"));
    assert!(stdout.contains("analyze: Created visualizations for multi_session.json"));
    assert!(stdout.contains("analyze: Created visualizations for single_session.json"));
    assert!(stdout.contains("CHAT DATA ANALYSIS SUMMARY REPORT"));
    assert!(stdout.contains("   • Total Tokens Used: 117"));
    assert!(stdout.contains("analyze: checkpoint summary_written"));
    assert!(stdout.contains("analyze: Analysis complete!"));
    assert!(stdout.contains("chatlens: completed `analyze` (exit_code=0)"));

    let out_dir = temp.join("out");
    assert!(out_dir.join("summary.json").is_file());
    assert!(
        out_dir
            .join("multi_session")
            .join("session_activity_heatmap.svg")
            .is_file()
    );
    assert!(!out_dir.join("malformed").exists());
}

#[test]
fn empty_data_dir_reports_no_files_and_succeeds() {
    let temp = unique_temp_dir("chatlens-progress-empty");

    let output = run_analyze(&temp);

    assert!(output.status.success(), "empty run should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("analyze: No JSON files found in"));
    assert!(!stdout.contains("CHAT DATA ANALYSIS SUMMARY REPORT"));
    assert!(temp.join("data").is_dir(), "data dir should be created");
    assert!(temp.join("out").is_dir(), "out dir should be created");
}

#[test]
fn only_unreadable_files_exit_cleanly_without_report() {
    let temp = unique_temp_dir("chatlens-progress-unreadable");
    write_data_file(
        &temp,
        "malformed.json",
        include_str!("../../../fixtures/chat_history/malformed.json"),
    );

    let output = run_analyze(&temp);

    assert!(output.status.success(), "run should still succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("analyze: checkpoint load_complete loaded=0 failed=1"));
    assert!(stdout.contains("analyze: No data loaded. Exiting."));
    assert!(!stdout.contains("analyze: stage build_table"));
    assert!(!temp.join("out").join("summary.json").exists());
}

#[test]
fn non_object_roots_count_as_unreadable() {
    let temp = unique_temp_dir("chatlens-progress-non-object");
    write_data_file(&temp, "list.json", "[1, 2]");
    write_data_file(&temp, "nothing.json", "null");

    let output = run_analyze(&temp);

    assert!(output.status.success(), "run should still succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("analyze: load_error file=list.json"));
    assert!(stdout.contains("analyze: load_error file=nothing.json"));
    assert!(stdout.contains("analyze: checkpoint load_complete loaded=0 failed=2"));
    assert!(stdout.contains("analyze: No data loaded. Exiting."));
    assert!(!stdout.contains("No chat turns found"));
}

#[test]
fn files_without_turns_exit_cleanly_without_report() {
    let temp = unique_temp_dir("chatlens-progress-no-turns");
    write_data_file(
        &temp,
        "no_history.json",
        include_str!("../../../fixtures/chat_history/no_history.json"),
    );

    let output = run_analyze(&temp);

    assert!(output.status.success(), "run should still succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("analyze: checkpoint table_built rows=0 files=0"));
    assert!(stdout.contains("analyze: No chat turns found. Exiting."));
    assert!(!stdout.contains("analyze: stage generate_charts"));
}

#[test]
fn unparseable_timestamp_fails_with_runtime_exit_code() {
    let temp = unique_temp_dir("chatlens-progress-bad-timestamp");
    write_data_file(
        &temp,
        "bad_timestamp.json",
        include_str!("../../../fixtures/chat_history/bad_timestamp.json"),
    );

    let output = run_analyze(&temp);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("analyze: stage build_table"));
    assert!(!stdout.contains("analyze: stage generate_charts"));
    assert!(stderr.contains("chatlens: failed `analyze` (exit_code=1)"));
    assert!(stderr.contains("failed to build chat table"));
    assert!(stderr.contains("yesterday afternoon"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_chatlens"))
        .args(["--no-such-flag"])
        .output()
        .expect("chatlens should execute");

    assert_eq!(output.status.code(), Some(64));
    assert!(output.stdout.is_empty());
}

#[test]
fn help_exits_successfully() {
    let output = Command::new(env!("CARGO_BIN_EXE_chatlens"))
        .args(["--help"])
        .output()
        .expect("chatlens should execute");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--data-dir"));
    assert!(stdout.contains("--out-dir"));
}
