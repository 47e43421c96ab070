// logsift - core/export.rs
//
// CSV and JSON export of scan summaries.
// Core layer: writes to any Write trait object. Summaries carry per-file
// counters only; the dedup outputs themselves are plain text and are not
// produced here.

use crate::core::model::FileReport;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export per-file scan summaries to JSON (array of objects).
pub fn export_summary_json<W: Write>(
    reports: &[FileReport],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, reports).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(reports.len())
}

/// Export per-file scan summaries to CSV, one row per scanned file.
pub fn export_summary_csv<W: Write>(
    reports: &[FileReport],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "input",
            "global_output",
            "session_output",
            "lines_read",
            "blocks_extracted",
            "unique_global",
            "unique_in_session",
            "duplicates_suppressed",
            "sessions",
            "failure_dumps",
            "cancelled",
        ])
        .map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for report in reports {
        let session_output = report
            .session_output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        csv_writer
            .write_record([
                &report.input.display().to_string(),
                &report.global_output.display().to_string(),
                &session_output,
                &report.stats.lines_read.to_string(),
                &report.stats.blocks_extracted.to_string(),
                &report.stats.unique_global.to_string(),
                &report.stats.unique_in_session.to_string(),
                &report.stats.duplicates_suppressed.to_string(),
                &report.stats.sessions.to_string(),
                &report.stats.failure_dumps.to_string(),
                &report.stats.cancelled.to_string(),
            ])
            .map_err(|e| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ScanStats;
    use std::path::PathBuf;

    fn make_report(input: &str, unique_global: u64) -> FileReport {
        FileReport {
            input: PathBuf::from(input),
            global_output: PathBuf::from(input).with_extension("err"),
            session_output: None,
            stats: ScanStats {
                lines_read: 120,
                blocks_extracted: unique_global + 1,
                unique_global,
                duplicates_suppressed: 1,
                sessions: 2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_csv_export() {
        let reports = vec![make_report("a.log", 3), make_report("b.log", 5)];
        let mut buf = Vec::new();
        let count = export_summary_csv(&reports, &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("input,global_output"));
        assert!(output.contains("a.log"));
        assert!(output.contains("b.log"));
        assert_eq!(output.lines().count(), 3, "header plus one row per file");
    }

    #[test]
    fn test_json_export() {
        let reports = vec![make_report("a.log", 3)];
        let mut buf = Vec::new();
        let count = export_summary_json(&reports, &mut buf, Path::new("out.json")).unwrap();
        assert_eq!(count, 1);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\"unique_global\": 3"));
        assert!(output.contains("a.err"));
    }

    #[test]
    fn test_csv_empty_session_output_column() {
        let reports = vec![make_report("a.log", 1)];
        let mut buf = Vec::new();
        export_summary_csv(&reports, &mut buf, Path::new("out.csv")).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let row = output.lines().nth(1).unwrap();
        assert!(row.contains("a.log,a.err,,120"), "empty session column: {row}");
    }
}
