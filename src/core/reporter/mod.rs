//! # Reporter Module
//!
//! Formats a [`BatchResult`] for standard output.
//!
//! ## Text Output
//! - One input, no rename: the bare hash, no newline
//! - Several inputs, no rename: `path<TAB>hash` per file, in input order,
//!   separated by the platform line separator, no trailing newline
//! - Renaming: nothing; the `source -> destination` announcements go to
//!   stderr as the batch runs
//!
//! ## JSON Output
//! The same information for any number of inputs, plus failures collected
//! under the continue policy.

use crate::core::batch::BatchResult;
use std::io::{self, Write};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Separates path and hash in multi-file text output
pub const FIELD_SEPARATOR: char = '\t';

/// Separates the lines of multi-file text output
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Render the text output contract
pub fn render_text(result: &BatchResult) -> String {
    if result.rename {
        return String::new();
    }

    let inputs = result.outcomes.len() + result.failures.len();

    if inputs == 1 {
        return result
            .outcomes
            .first()
            .map(|o| o.hash.clone())
            .unwrap_or_default();
    }

    result
        .hashes()
        .map(|(path, hash)| format!("{}{}{}", path.display(), FIELD_SEPARATOR, hash))
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Render the JSON document
pub fn render_json(result: &BatchResult) -> serde_json::Value {
    serde_json::json!({
        "algorithm": result.algorithm,
        "hash_size": result.hash_size,
        "rename": result.rename,
        "dry_run": result.dry_run,
        "files": result.outcomes,
        "failures": result.failures,
        "duration_ms": result.duration_ms,
    })
}

/// Write the report in the requested format
pub fn write_report<W: Write>(
    result: &BatchResult,
    format: OutputFormat,
    mut writer: W,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => write!(writer, "{}", render_text(result))?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &render_json(result))?;
            writeln!(writer)?;
        }
    }
    writer.flush()
}
