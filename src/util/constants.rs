// logsift - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every marker string the scanner matches against lives here so the exact
// literals are auditable in one place.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "logsift";

/// Application identifier used for config directories.
pub const APP_ID: &str = "logsift";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Record markers
// =============================================================================
//
// Exact literals as they appear in rule-engine debug logs. Matching is plain
// substring containment -- the surrounding text varies per product version,
// the markers do not.

/// Marks the line that opens a session's debug-message section.
pub const SESSION_START_MARKER: &str = "Starting Rule Debug Messages";

/// Key prefix preceding a session id, on both session-start and error lines.
pub const SESSION_ID_KEY: &str = "Session Id=";

/// Opening tag that starts an error record block.
pub const ERROR_START_MARKER: &str = "<Error>";

/// Second-line marker identifying a rule error with a group id.
pub const RULE_ERROR_MARKER: &str = "RULE ERROR: The rule with GROUP ID =";

/// Substring marking an exception line (stack-dump style records).
pub const EXCEPTION_TOKEN: &str = "Exception";

/// Token that terminates the identity-bearing prefix of a location line.
pub const LINE_POSITION_TOKEN: &str = "line";

/// Marker for an unsuccessful rule execution dump.
pub const RULE_FAILED_MARKER: &str = "Rule Ended [ Unsuccessfully ]";

// =============================================================================
// Scan limits
// =============================================================================

/// Number of lookahead slots in the scan window.
pub const WINDOW_SIZE: usize = 3;

/// Buffer size in bytes for reading log files.
pub const READ_BUFFER_SIZE: usize = 32 * 1024; // 32 KiB

/// Buffer size in bytes for the output sinks.
pub const WRITE_BUFFER_SIZE: usize = 32 * 1024; // 32 KiB

// =============================================================================
// Output naming
// =============================================================================

/// Extension of both output files (replaces the input extension).
pub const OUTPUT_EXTENSION: &str = "err";

/// Stem suffix distinguishing the per-session output from the global one.
pub const SESSION_OUTPUT_SUFFIX: &str = "_uniq_sesh";

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Maximum number of files to discover in a single scan.
pub const DEFAULT_MAX_FILES: usize = 500;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 10_000;

/// Hard upper bound on max depth (prevents infinite traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Default include glob patterns for log file discovery.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.log", "*.log.[0-9]*", "*.txt"];

/// Default exclude glob patterns for log file discovery.
/// `*.err` keeps previously generated outputs out of a re-scan.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] =
    &["*.err", "*.gz", "*.zip", "*.bak", "*.tmp", ".git"];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
