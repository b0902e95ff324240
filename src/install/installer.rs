//! Schema installer: turns the generic install script into backend specific
//! statements and runs them in file order.

use sqlx::AnyConnection;
use tracing::{debug, error};

use crate::db::Backend;
use crate::db::backend::GENERIC_PREFIX;
use crate::error::TrackletError;

/// Statements shorter than this are leftovers of splitting, not SQL.
const MIN_STATEMENT_LEN: usize = 5;

/// Substitute, strip comments and split the script into executable statements.
pub fn prepare(script: &str, backend: Backend, prefix: &str) -> Vec<String> {
    let mut pairs: Vec<(&str, &str)> = vec![(GENERIC_PREFIX, prefix)];
    pairs.extend_from_slice(backend.script_replacements());

    let text = substitute(script, &pairs);
    let text = strip_comments(&text);
    split_statements(&text)
}

/// Single-pass literal replacement. At each position the longest matching
/// key wins and replaced text is never scanned again.
pub fn substitute(text: &str, pairs: &[(&str, &str)]) -> String {
    let mut pairs: Vec<(&str, &str)> = pairs.iter().copied().filter(|(k, _)| !k.is_empty()).collect();
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while let Some(ch) = rest.chars().next() {
        for (from, to) in &pairs {
            if let Some(tail) = rest.strip_prefix(from) {
                out.push_str(to);
                rest = tail;
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Drop whole lines starting with `-- `.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !(line.starts_with("-- ") || *line == "--"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split on `;`, keeping statements longer than five characters after trimming.
pub fn split_statements(text: &str) -> Vec<String> {
    text.split(';')
        .map(str::trim)
        .filter(|stmt| stmt.len() > MIN_STATEMENT_LEN)
        .map(str::to_string)
        .collect()
}

/// Execute the statements in order. The first failure stops the run and
/// carries the offending statement.
pub async fn run(conn: &mut AnyConnection, statements: &[String]) -> Result<usize, TrackletError> {
    for (idx, stmt) in statements.iter().enumerate() {
        debug!(index = idx, "executing install statement");
        if let Err(e) = sqlx::query(stmt).execute(&mut *conn).await {
            error!(index = idx, statement = %stmt, error = %e, "install statement failed");
            return Err(TrackletError::schema(stmt.clone(), e));
        }
    }
    Ok(statements.len())
}
