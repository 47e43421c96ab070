// logsift - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no platform
// dependencies. These types are the shared vocabulary across all layers.

use serde::Serialize;
use std::path::PathBuf;

// =============================================================================
// Record block
// =============================================================================

/// A contiguous multi-line error excerpt, delimited by balanced
/// angle-bracket counting. Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBlock {
    /// The block's lines, in source order, starting at the error line.
    pub lines: Vec<String>,

    /// 1-based line number of the line that opened the block.
    pub start_line: u64,
}

impl RecordBlock {
    /// Running angle-bracket balance over all lines of the block.
    /// A well-formed block always sums to exactly 0.
    pub fn tag_balance(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| crate::core::extract::tag_balance(l))
            .sum()
    }
}

// =============================================================================
// Scan statistics
// =============================================================================

/// Counters accumulated over one scan of one log stream.
///
/// Serialisable so that the summary export can emit them unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    /// Total lines pulled from the source.
    pub lines_read: u64,

    /// Error blocks extracted (written or deduplicated away).
    pub blocks_extracted: u64,

    /// Blocks written to the global unique output.
    pub unique_global: u64,

    /// Blocks written to the per-session unique output.
    pub unique_in_session: u64,

    /// Blocks suppressed because their identity was already known globally.
    pub duplicates_suppressed: u64,

    /// Distinct session ids recorded from session-start markers.
    pub sessions: u64,

    /// Verbatim rule-failure dumps copied to the per-session output.
    pub failure_dumps: u64,

    /// True when the scan stopped early on a cancellation request.
    pub cancelled: bool,
}

// =============================================================================
// Per-file report
// =============================================================================

/// Outcome of scanning one input file: where the outputs landed and the
/// counters for the run. Collected per file in directory mode.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// The scanned input file.
    pub input: PathBuf,

    /// Path of the global unique output.
    pub global_output: PathBuf,

    /// Path of the per-session unique output, when enabled.
    pub session_output: Option<PathBuf>,

    /// Counters for this file's scan.
    pub stats: ScanStats,
}

// =============================================================================
// Discovered file
// =============================================================================

/// A log file accepted by discovery, with the metadata the scan layer needs.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Absolute or root-relative path to the file.
    pub path: PathBuf,

    /// File size in bytes at discovery time.
    pub size: u64,
}
