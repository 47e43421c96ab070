// logsift - tests/e2e_scan.rs
//
// End-to-end tests for the scan pipeline.
//
// These tests exercise the real filesystem: real input files, real
// buffered writers, real discovery traversal -- no mocks, no stubs. This
// covers the full path from a raw log file on disk to the deduplicated
// `.err` outputs downstream tooling consumes.

use logsift::app::scan::{scan_directory, scan_file, ScanOptions};
use logsift::core::discovery::DiscoveryConfig;
use logsift::core::export;
use logsift::util::error::{LogSiftError, ScanError};
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// Helpers
// =============================================================================

const SESSION_START_42: &str =
    "08:15:00.001|boot|Starting Rule Debug Messages Session Id=42 user=jdoe";
const RULE_L2: &str = "RULE ERROR: The rule with GROUP ID = 7781 could not be evaluated";

/// A four-line error block for `session`: line 1 leaves one tag open,
/// line 4 closes it.
fn rule_block(session: &str) -> String {
    format!(
        "08:15:02.114|wf-4|<Error> Session Id={session} <RuleTrace\n\
         {RULE_L2}\n   operand ACCT_BAL is missing\nRuleTrace> end\n"
    )
}

fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write log fixture");
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read output")
}

fn per_session_options() -> ScanOptions {
    ScanOptions {
        per_session: true,
        ..Default::default()
    }
}

// =============================================================================
// Single-file E2E
// =============================================================================

/// A file with a session start and a repeated error block produces one
/// deduplicated block plus the session trailer in `name.err`, and one
/// block in `name_uniq_sesh.err`.
#[test]
fn e2e_single_file_produces_both_outputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_log(
        dir.path(),
        "sample.log",
        &format!(
            "{SESSION_START_42}\n{}plain line\nanother line\n{}",
            rule_block("42"),
            rule_block("42")
        ),
    );

    let report = scan_file(&input, &per_session_options()).expect("scan");

    assert_eq!(report.global_output, dir.path().join("sample.err"));
    assert_eq!(
        report.session_output.as_deref(),
        Some(dir.path().join("sample_uniq_sesh.err").as_path())
    );

    let global = read(&report.global_output);
    assert_eq!(
        global.matches(RULE_L2).count(),
        1,
        "duplicate block collapsed: {global}"
    );
    assert!(global.ends_with("\n42\n"), "session trailer appended: {global}");

    let session = read(report.session_output.as_deref().expect("session path"));
    assert_eq!(session.matches(RULE_L2).count(), 1);
    assert!(!session.contains("\n42\n"), "trailer is global-only");

    assert_eq!(report.stats.blocks_extracted, 2);
    assert_eq!(report.stats.unique_global, 1);
    assert_eq!(report.stats.duplicates_suppressed, 1);
    assert_eq!(report.stats.sessions, 1);
}

/// Without --per-session no `_uniq_sesh.err` file is created at all.
#[test]
fn e2e_global_only_scan_creates_no_session_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_log(dir.path(), "sample.log", &rule_block("42"));

    let report = scan_file(&input, &ScanOptions::default()).expect("scan");

    assert!(report.session_output.is_none());
    assert!(!dir.path().join("sample_uniq_sesh.err").exists());
    assert!(report.global_output.exists());
}

/// An unsuccessful-rule dump is copied verbatim to the per-session output
/// and never touches the global one.
#[test]
fn e2e_rule_failure_dump_copied_verbatim() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dump = "rule RX-99 entered\n  step 4 failed\nRule Ended [ Unsuccessfully ] rule RX-99\n  cause: timeout\n  retry: none\n  gave up\n";
    let input = write_log(dir.path(), "rules.log", &format!("{dump}\ntrailing line\n"));

    let report = scan_file(&input, &per_session_options()).expect("scan");

    let session = read(report.session_output.as_deref().expect("session path"));
    assert_eq!(session, dump, "all six lines verbatim, terminator consumed");
    assert_eq!(read(&report.global_output), "");
    assert_eq!(report.stats.failure_dumps, 1);
}

/// Scenario: a block whose tags never balance aborts the file's scan with
/// a parse error; output written before the bad block is flushed, nothing
/// from the bad block appears.
#[test]
fn e2e_truncated_block_fails_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_log(
        dir.path(),
        "broken.log",
        &format!(
            "{}09:00:00.000|wf-9|<Error> Session Id=9 <Dangling\nnever closes\n",
            rule_block("42")
        ),
    );

    let err = scan_file(&input, &per_session_options()).expect_err("must fail");
    assert!(
        matches!(
            err,
            LogSiftError::Scan(ScanError::UnbalancedBlock { line_number: 5, .. })
        ),
        "expected UnbalancedBlock at line 5, got {err:?}"
    );

    let global = read(&dir.path().join("broken.err"));
    assert!(global.contains(RULE_L2), "earlier output was flushed");
    assert!(!global.contains("Dangling"), "no text from the bad block");
    let session = read(&dir.path().join("broken_uniq_sesh.err"));
    assert!(!session.contains("Dangling"));
}

// =============================================================================
// Directory E2E
// =============================================================================

/// Directory mode scans every discovered log file with an isolated
/// registry: the same identity appears in each file's own output.
#[test]
fn e2e_directory_scan_isolates_dedup_per_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_log(dir.path(), "node_a.log", &rule_block("42"));
    write_log(dir.path(), "node_b.log", &rule_block("77"));

    let (reports, warnings) = scan_directory(
        dir.path(),
        &per_session_options(),
        &DiscoveryConfig::default(),
    )
    .expect("directory scan");

    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(reports.len(), 2);
    for name in ["node_a.err", "node_b.err"] {
        let output = read(&dir.path().join(name));
        assert_eq!(
            output.matches(RULE_L2).count(),
            1,
            "{name} carries its own copy (no cross-file dedup)"
        );
    }
}

/// A file that fails mid-scan is reported as a warning; the other files
/// still produce their outputs.
#[test]
fn e2e_directory_scan_survives_a_failing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_log(dir.path(), "good.log", &rule_block("42"));
    write_log(
        dir.path(),
        "bad.log",
        "09:00:00.000|wf-9|<Error> Session Id=9 <Dangling\nnever closes\n",
    );

    let (reports, warnings) = scan_directory(
        dir.path(),
        &ScanOptions::default(),
        &DiscoveryConfig::default(),
    )
    .expect("directory scan");

    assert_eq!(reports.len(), 1, "only the good file produced a report");
    assert_eq!(reports[0].input.file_name().and_then(|n| n.to_str()), Some("good.log"));
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("bad.log"), "warning names the file: {warnings:?}");
    assert!(read(&dir.path().join("good.err")).contains(RULE_L2));
}

/// Discovery respects exclude patterns end-to-end: previously generated
/// `.err` outputs are not rescanned.
#[test]
fn e2e_directory_rescan_skips_previous_outputs() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_log(dir.path(), "app.log", &rule_block("42"));

    let options = ScanOptions::default();
    let (first, _) = scan_directory(dir.path(), &options, &DiscoveryConfig::default())
        .expect("first scan");
    assert_eq!(first.len(), 1);

    // Second scan: the app.err from the first run must not be picked up.
    let (second, _) = scan_directory(dir.path(), &options, &DiscoveryConfig::default())
        .expect("second scan");
    assert_eq!(second.len(), 1);
    assert_eq!(
        second[0].input.file_name().and_then(|n| n.to_str()),
        Some("app.log")
    );
}

// =============================================================================
// Summary export E2E
// =============================================================================

/// The JSON summary written for a real scan round-trips the counters.
#[test]
fn e2e_json_summary_reflects_scan() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_log(
        dir.path(),
        "sample.log",
        &format!("{SESSION_START_42}\n{}", rule_block("42")),
    );

    let report = scan_file(&input, &ScanOptions::default()).expect("scan");
    let summary_path = dir.path().join("summary.json");
    let file = fs::File::create(&summary_path).expect("create summary");
    export::export_summary_json(&[report], file, &summary_path).expect("export");

    let summary = read(&summary_path);
    assert!(summary.contains("\"unique_global\": 1"), "{summary}");
    assert!(summary.contains("\"sessions\": 1"));
    assert!(summary.contains("sample.err"));
}
