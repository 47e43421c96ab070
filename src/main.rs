// logsift - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (platform config.toml or --config)
// 3. Logging initialisation (debug mode support)
// 4. File or directory scan dispatch and summary export

use clap::Parser;
use logsift::app::scan::{self, ScanOptions};
use logsift::core::discovery::DiscoveryConfig;
use logsift::core::export;
use logsift::core::model::FileReport;
use logsift::platform;
use logsift::util;
use logsift::util::constants;
use logsift::util::error::{LogSiftError, Result};
use std::fs::File;
use std::path::PathBuf;

/// logsift - streaming extractor and deduplicator for rule-engine debug logs.
///
/// Point logsift at a log file (or a directory of log files) to compress
/// the stream down to its first-occurrence error blocks: `name.err` holds
/// the globally unique blocks and the session-id trailer; with
/// --per-session, `name_uniq_sesh.err` additionally holds each session's
/// first occurrences and verbatim unsuccessful-rule dumps.
#[derive(Parser, Debug)]
#[command(name = "logsift", version, about)]
struct Cli {
    /// Log file to scan, or directory to discover log files under.
    path: PathBuf,

    /// Also write per-session unique output (enables rule-failure capture).
    #[arg(short = 's', long = "per-session")]
    per_session: bool,

    /// Explicit config.toml path (overrides the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Write a JSON scan summary to this path.
    #[arg(long = "summary-json")]
    summary_json: Option<PathBuf>,

    /// Write a CSV scan summary to this path.
    #[arg(long = "summary-csv")]
    summary_csv: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging so [logging] level can take effect;
    // config warnings are replayed once tracing is up.
    let (config, config_warnings) = match &cli.config {
        Some(path) => match platform::config::load_config_file(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => {
            let paths = platform::config::PlatformPaths::resolve();
            platform::config::load_default_config(&paths)
        }
    };

    util::logging::init(cli.debug, config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        version = constants::APP_VERSION,
        path = %cli.path.display(),
        "logsift starting"
    );

    match run(&cli, &config) {
        Ok(()) => {}
        Err(e) => {
            tracing::error!(error = %e, "Scan failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, config: &platform::config::AppConfig) -> Result<()> {
    let options = ScanOptions {
        per_session: cli.per_session || config.per_session,
        cancel_flag: None,
    };

    let reports = if cli.path.is_dir() {
        let discovery_config = DiscoveryConfig {
            max_depth: config.max_depth,
            max_files: config.max_files,
            include_patterns: config.include_patterns.clone(),
            exclude_patterns: config.exclude_patterns.clone(),
        };
        let (reports, warnings) = scan::scan_directory(&cli.path, &options, &discovery_config)?;
        for warning in &warnings {
            eprintln!("Warning: {warning}");
        }
        reports
    } else {
        vec![scan::scan_file(&cli.path, &options)?]
    };

    for report in &reports {
        print_report(report);
    }

    if let Some(path) = &cli.summary_json {
        let file = File::create(path).map_err(|source| LogSiftError::Io {
            path: path.clone(),
            operation: "create",
            source,
        })?;
        export::export_summary_json(&reports, file, path)?;
        tracing::info!(path = %path.display(), "JSON summary written");
    }

    if let Some(path) = &cli.summary_csv {
        let file = File::create(path).map_err(|source| LogSiftError::Io {
            path: path.clone(),
            operation: "create",
            source,
        })?;
        export::export_summary_csv(&reports, file, path)?;
        tracing::info!(path = %path.display(), "CSV summary written");
    }

    Ok(())
}

fn print_report(report: &FileReport) {
    let stats = &report.stats;
    println!(
        "{}: {} unique of {} blocks, {} sessions -> {}",
        report.input.display(),
        stats.unique_global,
        stats.blocks_extracted,
        stats.sessions,
        report.global_output.display()
    );
    if let Some(session_output) = &report.session_output {
        println!(
            "{}: {} per-session blocks, {} rule-failure dumps -> {}",
            report.input.display(),
            stats.unique_in_session,
            stats.failure_dumps,
            session_output.display()
        );
    }
}
