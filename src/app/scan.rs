// logsift - app/scan.rs
//
// Scan lifecycle management: the filesystem boundary around the core
// engine. Opens inputs, derives output paths, owns the buffered sinks,
// and fans out over discovered files in directory mode.
//
// Output naming follows the established convention downstream tooling
// expects: `name.log` produces `name.err` (global unique output) and,
// with per-session output enabled, `name_uniq_sesh.err`, both next to
// the input file.
//
// Directory mode scans files in parallel with one isolated registry per
// file -- no cross-file dedup. Callers that want dedup across streams use
// `core::engine::scan_with_registry` directly, single-threaded.

use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::engine::{self, ScanConfig};
use crate::core::model::FileReport;
use crate::util::constants;
use crate::util::error::{LogSiftError, Result};
use rayon::prelude::*;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

// =============================================================================
// Options
// =============================================================================

/// Caller-facing scan options, resolved from CLI flags and config.
#[derive(Debug, Default, Clone)]
pub struct ScanOptions {
    /// Also write the per-session unique output (enables rule-failure
    /// capture).
    pub per_session: bool,

    /// Optional cooperative cancel flag, shared across all files of a
    /// directory scan.
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

// =============================================================================
// Single-file scan
// =============================================================================

/// Scan one log file and write its outputs next to it.
///
/// Fatal for this file on truncated blocks and sink failures; the sinks
/// are flushed before the error propagates, so everything written up to
/// the failure is on disk.
pub fn scan_file(input: &Path, options: &ScanOptions) -> Result<FileReport> {
    let file = File::open(input).map_err(|source| LogSiftError::Io {
        path: input.to_path_buf(),
        operation: "open",
        source,
    })?;
    let reader = BufReader::with_capacity(constants::READ_BUFFER_SIZE, file);

    let global_path = output_path(input, "");
    let mut global = open_sink(&global_path)?;

    let session_path = options
        .per_session
        .then(|| output_path(input, constants::SESSION_OUTPUT_SUFFIX));
    let mut session = match &session_path {
        Some(path) => Some(open_sink(path)?),
        None => None,
    };

    let config = ScanConfig {
        cancel_flag: options.cancel_flag.clone(),
    };

    tracing::debug!(
        input = %input.display(),
        global = %global_path.display(),
        per_session = options.per_session,
        "Scan starting"
    );

    let stats = engine::scan(reader, &mut global, session.as_mut(), &config)
        .map_err(LogSiftError::Scan)?;

    tracing::info!(
        input = %input.display(),
        lines = stats.lines_read,
        unique_global = stats.unique_global,
        sessions = stats.sessions,
        "Scan complete"
    );

    Ok(FileReport {
        input: input.to_path_buf(),
        global_output: global_path,
        session_output: session_path,
        stats,
    })
}

// =============================================================================
// Directory scan
// =============================================================================

/// Discover log files under `root` and scan each one.
///
/// Files are processed in parallel, each with its own registry, so dedup
/// is per file. Per-file failures are non-fatal for the run: they are
/// logged, recorded as warnings, and the remaining files still scanned.
pub fn scan_directory(
    root: &Path,
    options: &ScanOptions,
    discovery_config: &DiscoveryConfig,
) -> Result<(Vec<FileReport>, Vec<String>)> {
    let (files, mut warnings) = discovery::discover_files(root, discovery_config)?;

    tracing::info!(
        root = %root.display(),
        files = files.len(),
        "Directory scan starting"
    );

    let results: Vec<(PathBuf, Result<FileReport>)> = files
        .par_iter()
        .map(|f| (f.path.clone(), scan_file(&f.path, options)))
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    for (path, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "File scan failed");
                warnings.push(format!("'{}': {e}", path.display()));
            }
        }
    }

    Ok((reports, warnings))
}

// =============================================================================
// Output paths
// =============================================================================

/// Derive an output path from the input: the input's stem, an optional
/// suffix, and the `.err` extension, in the input's directory.
///
/// `report.log` -> `report.err` / `report_uniq_sesh.err`;
/// `report.log.3` keeps its inner extension: `report.log.err`.
fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_else(|| OsStr::new("output"));
    let mut name = stem.to_os_string();
    name.push(suffix);
    name.push(".");
    name.push(constants::OUTPUT_EXTENSION);
    input.with_file_name(name)
}

fn open_sink(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|source| LogSiftError::Io {
        path: path.to_path_buf(),
        operation: "create",
        source,
    })?;
    Ok(BufWriter::with_capacity(constants::WRITE_BUFFER_SIZE, file))
}
