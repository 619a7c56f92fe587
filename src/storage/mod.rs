//! Persistence layer.
//!
//! The only thing kept across runs is the score log: a flat text file
//! with one final score per line, appended and never truncated.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Default score log path.
pub const DEFAULT_SCORE_LOG: &str = "data.txt";

/// Append one score line to the log, creating the file if needed.
pub fn append_score(score: i64, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_SCORE_LOG);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open score log {path}"))?;

    writeln!(file, "{score}").with_context(|| format!("Failed to write score to {path}"))?;

    debug!(path, score, "Score appended");
    Ok(())
}

/// Read every score in the log. A missing file is an empty log.
pub fn read_scores(path: Option<&str>) -> Result<Vec<i64>> {
    let path = path.unwrap_or(DEFAULT_SCORE_LOG);
    if !Path::new(path).exists() {
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read score log {path}"))?;

    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<i64>()
                .with_context(|| format!("Bad score line in {path}: {line:?}"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
