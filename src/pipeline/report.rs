//! Run bookkeeping: the human-readable cleaning log and per-step row/column deltas.

use super::spec::Operation;
use serde::Serialize;
use std::path::PathBuf;

/// Ordered, append-only list of log lines produced by one run.
///
/// Every pushed line is also emitted as a `tracing` info event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CleaningLog {
    lines: Vec<String>,
}

impl CleaningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("{line}");
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines joined with newlines, ready for a message box or terminal.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Shape of the table before and after one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub operation: Operation,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
}

impl StepReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Report generated after a full load → clean → write run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub output: PathBuf,

    /// Number of rows before processing
    pub rows_before: usize,

    /// Number of columns before processing
    pub columns_before: usize,

    /// Number of rows after processing
    pub rows_after: usize,

    /// Number of columns after processing
    pub columns_after: usize,

    /// One entry per applied operation, in the order they ran
    pub steps: Vec<StepReport>,

    /// Lines to show the user
    pub log: CleaningLog,

    /// Time taken for the run
    #[serde(skip)]
    pub duration: std::time::Duration,
}

impl RunReport {
    /// One-line summary for status bars and the application log
    pub fn summary(&self) -> String {
        format!(
            "Cleaning completed: rows {} → {} ({} removed), columns {} → {}, {} steps, {:.2}s",
            self.rows_before,
            self.rows_after,
            self.rows_removed(),
            self.columns_before,
            self.columns_after,
            self.steps.len(),
            self.duration.as_secs_f64()
        )
    }

    /// Rows removed by the whole run.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}
