// logsift - core/engine.rs
//
// The single-pass scan engine.
//
// Drives the lookahead window over one log stream and dispatches on the
// oldest populated slot: session-start markers feed the session log, error
// markers open the block pipeline (extract -> classify -> dedup -> sinks),
// and the unsuccessful-rule marker in the third slot opens a verbatim dump
// when per-session output is enabled. Everything else advances the window
// by one line. End-of-stream is the only terminal condition; a truncated
// block aborts the scan.
//
// The engine owns its session log and (by default) its registry; sinks are
// flushed on every exit path, including the fatal-truncation one.

use crate::core::dedup::{DedupRegistry, Scope, SessionLog};
use crate::core::extract;
use crate::core::identity;
use crate::core::model::{RecordBlock, ScanStats};
use crate::core::window::LineWindow;
use crate::util::constants;
use crate::util::error::ScanError;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// =============================================================================
// Configuration
// =============================================================================

/// Per-scan engine configuration.
#[derive(Debug, Default, Clone)]
pub struct ScanConfig {
    /// Optional cooperative cancel flag, checked once per scan step.
    /// Cancellation stops the scan cleanly: the trailer is still written,
    /// the sinks are flushed, and the stats carry `cancelled = true`.
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

// =============================================================================
// Entry points
// =============================================================================

/// Scan one log stream with a fresh registry.
///
/// Deduplicated blocks go to `global`; when `per_session` is given, blocks
/// new to their session and verbatim rule-failure dumps go there too. The
/// session-id trailer is appended to `global` after the scan.
pub fn scan<R, G, S>(
    source: R,
    global: &mut G,
    per_session: Option<&mut S>,
    config: &ScanConfig,
) -> Result<ScanStats, ScanError>
where
    R: BufRead,
    G: Write,
    S: Write,
{
    let mut registry = DedupRegistry::new();
    scan_with_registry(source, global, per_session, &mut registry, config)
}

/// Scan one log stream against a caller-owned registry.
///
/// Reusing one registry across streams extends dedup across them; the
/// caller is then responsible for serialising access (the engine itself is
/// strictly single-threaded per stream).
pub fn scan_with_registry<R, G, S>(
    source: R,
    global: &mut G,
    per_session: Option<&mut S>,
    registry: &mut DedupRegistry,
    config: &ScanConfig,
) -> Result<ScanStats, ScanError>
where
    R: BufRead,
    G: Write,
    S: Write,
{
    let mut scan = Scan {
        window: LineWindow::new(source)?,
        global,
        per_session,
        registry,
        session_log: SessionLog::new(),
        stats: ScanStats::default(),
    };

    let outcome = scan.run(config);
    scan.stats.lines_read = scan.window.lines_read();
    // Flush both sinks on every exit path, truncation included.
    let flushed = scan.flush();
    outcome.and(flushed)?;
    Ok(scan.stats)
}

// =============================================================================
// Scan state
// =============================================================================

struct Scan<'a, R: BufRead, G: Write, S: Write> {
    window: LineWindow<R>,
    global: &'a mut G,
    per_session: Option<&'a mut S>,
    registry: &'a mut DedupRegistry,
    session_log: SessionLog,
    stats: ScanStats,
}

impl<R: BufRead, G: Write, S: Write> Scan<'_, R, G, S> {
    fn run(&mut self, config: &ScanConfig) -> Result<(), ScanError> {
        loop {
            if config
                .cancel_flag
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
            {
                tracing::debug!("Scan cancelled by request");
                self.stats.cancelled = true;
                break;
            }

            let (session_start, error_start) = match self.window.slot(0) {
                Some(first) => (
                    first.contains(constants::SESSION_START_MARKER)
                        && first.contains(constants::SESSION_ID_KEY),
                    first.contains(constants::ERROR_START_MARKER),
                ),
                None => break,
            };

            if session_start {
                self.record_session_start();
                self.window.advance()?;
            } else if error_start {
                self.process_error_block()?;
            } else if self.per_session.is_some()
                && self
                    .window
                    .slot(2)
                    .is_some_and(|l| l.contains(constants::RULE_FAILED_MARKER))
            {
                self.capture_failure_dump()?;
            } else {
                self.window.advance()?;
            }
        }

        self.write_trailer()
    }

    /// Register the id from a session-start line into the session log.
    fn record_session_start(&mut self) {
        let id = self
            .window
            .slot(0)
            .and_then(session_start_id)
            .map(str::to_string);
        if let Some(id) = id {
            if self.session_log.record(&id) {
                self.stats.sessions += 1;
                tracing::debug!(session = %id, "Session start recorded");
            }
        }
    }

    /// The block pipeline: extract, classify, dedup per scope, emit.
    fn process_error_block(&mut self) -> Result<(), ScanError> {
        let start_line = self.window.front_line_number();
        // Classification reads the two lines following the error line in
        // the window; the block itself may close before reaching them.
        let next = self.window.slot(1).map(str::to_string);
        let after_next = self.window.slot(2).map(str::to_string);
        let Some(first) = self.window.take_front() else {
            return Ok(());
        };

        let session_id = error_session_id(&first);
        let identity = identity::classify(&first, next.as_deref(), after_next.as_deref());
        let block = extract::extract_block(&mut self.window, first, start_line)?;
        // Lookahead lines the block did not consume are dropped with it;
        // the scan resumes on fresh input.
        self.window.refill()?;

        self.stats.blocks_extracted += 1;

        let new_globally = self.registry.first_occurrence(Scope::Global, &identity);
        if new_globally {
            write_block(self.global, &block)?;
            self.stats.unique_global += 1;
        } else {
            self.stats.duplicates_suppressed += 1;
        }

        if let Some(out) = self.per_session.as_mut() {
            let new_in_session = self
                .registry
                .first_occurrence(Scope::Session(session_id.clone()), &identity);
            if new_in_session {
                write_block(out, &block)?;
                self.stats.unique_in_session += 1;
            }
        }

        tracing::trace!(
            line = start_line,
            session = %session_id,
            new_globally,
            lines = block.lines.len(),
            "Error block processed"
        );
        Ok(())
    }

    /// Copy the buffered lines and every following source line verbatim to
    /// the per-session sink, until a blank line (consumed, not written) or
    /// end of stream. No classification, no dedup.
    fn capture_failure_dump(&mut self) -> Result<(), ScanError> {
        let start_line = self.window.front_line_number();
        let mut copied = 0u64;

        while let Some(line) = self.window.take_front() {
            if let Some(out) = self.per_session.as_mut() {
                write_line(out, &line)?;
            }
            copied += 1;
        }
        while let Some(line) = self.window.pull()? {
            if line.is_empty() {
                break;
            }
            if let Some(out) = self.per_session.as_mut() {
                write_line(out, &line)?;
            }
            copied += 1;
        }

        self.window.refill()?;
        self.stats.failure_dumps += 1;
        tracing::debug!(
            line = start_line,
            lines = copied,
            "Unsuccessful-rule dump captured"
        );
        Ok(())
    }

    /// Append the session ids, one per line, to the global sink.
    fn write_trailer(&mut self) -> Result<(), ScanError> {
        for id in self.session_log.ids() {
            writeln!(self.global, "{id}").map_err(|source| ScanError::Sink { source })?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ScanError> {
        self.global
            .flush()
            .map_err(|source| ScanError::Sink { source })?;
        if let Some(out) = self.per_session.as_mut() {
            out.flush().map_err(|source| ScanError::Sink { source })?;
        }
        Ok(())
    }
}

// =============================================================================
// Marker field extraction
// =============================================================================

/// Id on a session-start line: the substring after `Session Id=` up to the
/// next space.
fn session_start_id(line: &str) -> Option<&str> {
    let idx = line.find(constants::SESSION_ID_KEY)?;
    let rest = &line[idx + constants::SESSION_ID_KEY.len()..];
    rest.split(' ').next()
}

/// Id on an error line: the run of ASCII digits immediately after the first
/// `Session Id=`. Empty when the key is missing or no digit follows.
fn error_session_id(line: &str) -> String {
    match line.find(constants::SESSION_ID_KEY) {
        Some(idx) => line[idx + constants::SESSION_ID_KEY.len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect(),
        None => String::new(),
    }
}

// =============================================================================
// Sink helpers
// =============================================================================

fn write_line<W: Write>(w: &mut W, line: &str) -> Result<(), ScanError> {
    writeln!(w, "{line}").map_err(|source| ScanError::Sink { source })
}

fn write_block<W: Write>(w: &mut W, block: &RecordBlock) -> Result<(), ScanError> {
    for line in &block.lines {
        write_line(w, line)?;
    }
    // Blank separator after every block.
    write_line(w, "")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // A four-line rule-error block for session 42. Line 1 leaves one tag
    // open; line 4 closes it.
    const RULE_L1: &str = "08:15:02.114|wf-4|<Error> Session Id=42 <RuleTrace";
    const RULE_L2: &str = "RULE ERROR: The rule with GROUP ID = 7781 could not be evaluated";
    const RULE_L3: &str = "   operand ACCT_BAL is missing";
    const RULE_L4: &str = "RuleTrace> end";

    const SESSION_START_42: &str =
        "08:15:00.001|boot|Starting Rule Debug Messages Session Id=42 user=jdoe";
    const SESSION_START_7: &str =
        "08:16:00.001|boot|Starting Rule Debug Messages Session Id=7 user=asmith";

    fn rule_block(session: &str) -> String {
        format!(
            "08:15:02.114|wf-4|<Error> Session Id={session} <RuleTrace\n\
             {RULE_L2}\n{RULE_L3}\n{RULE_L4}\n"
        )
    }

    fn generic_block(session: &str, message: &str) -> String {
        format!(
            "08:20:01.330|db-1|<Error> Session Id={session} <Stmt\n\
                <Detail>statement failed\n   </Detail>\nStmt> |{message}\n"
        )
    }

    fn run(input: &str) -> (String, String, ScanStats) {
        let mut global = Vec::new();
        let mut session = Vec::new();
        let stats = scan(
            Cursor::new(input.as_bytes().to_vec()),
            &mut global,
            Some(&mut session),
            &ScanConfig::default(),
        )
        .expect("scan");
        (
            String::from_utf8(global).expect("utf8"),
            String::from_utf8(session).expect("utf8"),
            stats,
        )
    }

    fn run_global_only(input: &str) -> (String, ScanStats) {
        let mut global = Vec::new();
        let stats = scan(
            Cursor::new(input.as_bytes().to_vec()),
            &mut global,
            None::<&mut Vec<u8>>,
            &ScanConfig::default(),
        )
        .expect("scan");
        (String::from_utf8(global).expect("utf8"), stats)
    }

    #[test]
    fn test_single_block_is_emitted_with_separator() {
        let input = format!("boot line\n{}tail line\n", rule_block("42"));
        let (global, session, stats) = run(&input);
        let expected = format!("{RULE_L1}\n{RULE_L2}\n{RULE_L3}\n{RULE_L4}\n\n");
        assert_eq!(global, expected);
        assert_eq!(session, expected);
        assert_eq!(stats.blocks_extracted, 1);
        assert_eq!(stats.unique_global, 1);
        assert_eq!(stats.unique_in_session, 1);
        assert_eq!(stats.duplicates_suppressed, 0);
    }

    /// Scenario: two error blocks for session "42" sharing one RULE ERROR
    /// group-id line collapse to one block in each scope.
    #[test]
    fn test_shared_rule_error_dedups_globally_and_in_session() {
        let input = format!(
            "start\n{}between\nmore between\n{}end\n",
            rule_block("42"),
            rule_block("42")
        );
        let (global, session, stats) = run(&input);
        assert_eq!(global.matches(RULE_L2).count(), 1, "one block globally");
        assert_eq!(session.matches(RULE_L2).count(), 1, "one block for session 42");
        assert_eq!(stats.blocks_extracted, 2);
        assert_eq!(stats.duplicates_suppressed, 1);
    }

    /// Scenario: sessions "1" and "2" each raise a distinct identity.
    #[test]
    fn test_distinct_sessions_distinct_identities() {
        let input = format!(
            "{}\n{}\n{}{}",
            SESSION_START_42.replace("Id=42", "Id=1"),
            SESSION_START_7.replace("Id=7", "Id=2"),
            generic_block("1", "ORA-00942: table or view does not exist"),
            generic_block("2", "ORA-01017: invalid credentials")
        );
        let (global, session, stats) = run(&input);
        assert_eq!(stats.unique_global, 2);
        assert_eq!(stats.unique_in_session, 2);
        let first = global.find("ORA-00942").expect("first identity in global");
        let second = global.find("ORA-01017").expect("second identity in global");
        assert!(first < second, "global output preserves first-seen order");
        assert_eq!(session.matches("ORA-00942").count(), 1);
        assert_eq!(session.matches("ORA-01017").count(), 1);
    }

    /// An identity already known globally is still written once to every
    /// session that encounters it.
    #[test]
    fn test_global_duplicate_still_new_per_session() {
        let input = format!("{}{}", rule_block("42"), rule_block("43"));
        let (global, session, stats) = run(&input);
        assert_eq!(global.matches(RULE_L2).count(), 1);
        assert_eq!(session.matches(RULE_L2).count(), 2, "once per session");
        assert_eq!(stats.unique_global, 1);
        assert_eq!(stats.unique_in_session, 2);
        assert_eq!(stats.duplicates_suppressed, 1);
    }

    #[test]
    fn test_session_trailer_order_and_dedup() {
        let input = format!(
            "{SESSION_START_42}\nnoise\n{SESSION_START_7}\n{SESSION_START_42}\nnoise\n"
        );
        let (global, _, stats) = run(&input);
        assert_eq!(global, "42\n7\n");
        assert_eq!(stats.sessions, 2);
    }

    /// Scenario: a rule-failure marker with three continuation lines and a
    /// blank terminator is copied verbatim, untouched by dedup.
    #[test]
    fn test_failure_dump_copied_verbatim() {
        let dump = "rule RX-99 entered\n  step 4 failed\nRule Ended [ Unsuccessfully ] rule RX-99\n  cause: timeout\n  retry: none\n  gave up\n";
        let input = format!("{dump}\nafter\n");
        let (global, session, stats) = run(&input);
        assert_eq!(session, dump, "all six lines verbatim, blank line consumed");
        assert_eq!(global, "", "dump bypasses the global output");
        assert_eq!(stats.failure_dumps, 1);
        assert_eq!(stats.blocks_extracted, 0);
    }

    #[test]
    fn test_failure_dump_ignored_without_per_session_output() {
        let input = "rule RX-99 entered\n  step 4 failed\nRule Ended [ Unsuccessfully ] rule RX-99\n  cause: timeout\n\nafter\n";
        let (global, stats) = run_global_only(input);
        assert_eq!(global, "");
        assert_eq!(stats.failure_dumps, 0);
        assert_eq!(stats.lines_read, 6, "lines flow through the normal scan");
    }

    /// Scenario: a block whose tags never balance aborts the scan; nothing
    /// from the block reaches either output.
    #[test]
    fn test_truncated_block_aborts_scan() {
        let good = rule_block("42");
        let input = format!("{good}08:30:00.000|wf-9|<Error> Session Id=9 <Dangling\nnever closes\n");
        let mut global = Vec::new();
        let mut session = Vec::new();
        let err = scan(
            Cursor::new(input.as_bytes().to_vec()),
            &mut global,
            Some(&mut session),
            &ScanConfig::default(),
        )
        .expect_err("truncated block must abort");
        assert!(matches!(err, ScanError::UnbalancedBlock { line_number: 5, .. }));

        let global = String::from_utf8(global).expect("utf8");
        let session = String::from_utf8(session).expect("utf8");
        assert!(!global.contains("Dangling"), "no text from the bad block");
        assert!(!session.contains("Dangling"));
        // Earlier output was flushed before the abort.
        assert!(global.contains(RULE_L2));
    }

    #[test]
    fn test_error_marker_on_last_line_is_still_extracted() {
        // Balanced on its own line, with both lookahead slots absent.
        let input = "noise\nnoise\n08:44:00.000|tail|<Error> gave up\n";
        let (global, _, stats) = run(input);
        assert_eq!(global, "08:44:00.000|tail|<Error> gave up\n\n");
        assert_eq!(stats.blocks_extracted, 1);
    }

    #[test]
    fn test_error_without_session_key_uses_empty_session_id() {
        // No "Session Id=" on the error line: the block still dedups, under
        // the empty-string session.
        let block = "09:00:00.000|wf|<Error> detached <T\nT> closed\n";
        let input = format!("{block}{block}");
        let (_, session, stats) = run(&input);
        assert_eq!(stats.blocks_extracted, 2);
        assert_eq!(stats.unique_in_session, 1, "second block is a dup of session \"\"");
        assert_eq!(session.matches("detached").count(), 1);
    }

    #[test]
    fn test_cancel_flag_stops_scan_cleanly() {
        let flag = Arc::new(AtomicBool::new(true));
        let config = ScanConfig {
            cancel_flag: Some(Arc::clone(&flag)),
        };
        let input = format!("{SESSION_START_42}\n{}", rule_block("42"));
        let mut global = Vec::new();
        let stats = scan(
            Cursor::new(input.as_bytes().to_vec()),
            &mut global,
            None::<&mut Vec<u8>>,
            &config,
        )
        .expect("cancelled scan still succeeds");
        assert!(stats.cancelled);
        assert_eq!(stats.blocks_extracted, 0);
        assert_eq!(String::from_utf8(global).expect("utf8"), "");
    }

    #[test]
    fn test_session_id_extraction_helpers() {
        assert_eq!(session_start_id(SESSION_START_42), Some("42"));
        assert_eq!(
            session_start_id("Starting Rule Debug Messages Session Id=77"),
            Some("77")
        );
        assert_eq!(session_start_id("no key here"), None);

        assert_eq!(error_session_id("<Error> Session Id=421983 more"), "421983");
        assert_eq!(error_session_id("<Error> Session Id=42A9"), "42");
        assert_eq!(error_session_id("<Error> Session Id=x"), "");
        assert_eq!(error_session_id("<Error> no key"), "");
    }
}
