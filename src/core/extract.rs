// logsift - core/extract.rs
//
// Record-block extraction by balanced angle-bracket counting.
//
// A block opens at the error line and closes the instant the running
// balance of '<' (+1) and '>' (-1) returns to zero, evaluated after each
// whole line. Continuation lines come from the remaining window slots
// first, then straight from the source without bound. A source that ends
// while the balance is still positive is a truncated block: fatal, and
// nothing from the block is emitted.

use crate::core::model::RecordBlock;
use crate::core::window::LineWindow;
use crate::util::error::ScanError;
use std::io::BufRead;

/// Running angle-bracket balance of a single line.
pub fn tag_balance(line: &str) -> i64 {
    let mut balance = 0i64;
    for b in line.bytes() {
        match b {
            b'<' => balance += 1,
            b'>' => balance -= 1,
            _ => {}
        }
    }
    balance
}

/// Extract a complete record block starting at `first` (already removed
/// from the window). `start_line` is the 1-based number of that line.
///
/// Consumes remaining window slots before pulling further source lines.
/// Lines left in the window when the block closes early stay there; the
/// caller decides what to do with them.
pub fn extract_block<R: BufRead>(
    window: &mut LineWindow<R>,
    first: String,
    start_line: u64,
) -> Result<RecordBlock, ScanError> {
    let mut balance = tag_balance(&first);
    let mut lines = vec![first];

    while balance > 0 {
        let next = match window.take_front() {
            Some(line) => Some(line),
            None => window.pull()?,
        };
        match next {
            Some(line) => {
                balance += tag_balance(&line);
                lines.push(line);
            }
            None => {
                return Err(ScanError::UnbalancedBlock {
                    line_number: start_line,
                    start_line: lines[0].clone(),
                });
            }
        }
    }

    Ok(RecordBlock { lines, start_line })
}
