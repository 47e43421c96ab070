// logsift - core/identity.rs
//
// Error-identity classification.
//
// Maps the leading lines of an error record to the canonical string used
// as its dedup key. The decision order and the literal substring matches
// are fixed: these tokens appear verbatim in real rule-engine logs, and
// reordering the branches (or substituting pattern matching) changes which
// blocks collapse together. The identity is only ever compared for
// equality; it is never emitted.

use crate::util::constants;

/// Derive the dedup identity from an error record's leading lines.
///
/// `error_line` is the line carrying the `<Error>` marker; `next` and
/// `after_next` are the two lines that follow it in the window, when the
/// stream still has them. Absent lines match nothing.
///
/// Decision order:
/// 1. `next` carries a RULE ERROR group id -> identity is `next` verbatim.
/// 2. `next` mentions an exception -> identity is `next` verbatim.
/// 3. `after_next` mentions an exception -> identity is the trimmed prefix
///    of `next` before the first `line` token, or `after_next` verbatim
///    when `next` is blank.
/// 4. Otherwise -> identity is the trimmed tail of `error_line` after its
///    last `|`, degrading to the empty string when there is no `|`.
///
/// Pure function: equal inputs always produce equal identities.
pub fn classify(error_line: &str, next: Option<&str>, after_next: Option<&str>) -> String {
    let next = next.unwrap_or("");
    let after_next = after_next.unwrap_or("");

    if next.contains(constants::RULE_ERROR_MARKER) {
        return next.to_string();
    }

    if next.contains(constants::EXCEPTION_TOKEN) {
        return next.to_string();
    }

    if after_next.contains(constants::EXCEPTION_TOKEN) {
        if !next.trim().is_empty() {
            let prefix = match next.find(constants::LINE_POSITION_TOKEN) {
                Some(idx) => &next[..idx],
                None => next,
            };
            return prefix.trim().to_string();
        }
        return after_next.to_string();
    }

    match error_line.rfind('|') {
        Some(idx) => error_line[idx + 1..].trim().to_string(),
        None => String::new(),
    }
}
