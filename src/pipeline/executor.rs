//! Cleaning execution engine.
//!
//! Applies the enabled operations in canonical order, records the table shape
//! around every step, and drives the full load → clean → write run.

use super::report::{CleaningLog, RunReport, StepReport};
use super::spec::{CleaningRequest, OperationSet};
use super::steps::apply_operation;
use super::validation::validate_request;
use crate::error::{Result, ResultExt as _, TidyError};
use crate::table::{load_table, save_table};
use polars::prelude::DataFrame;
use std::path::Path;

/// Result of cleaning an in-memory table.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub table: DataFrame,
    pub steps: Vec<StepReport>,
    pub log: CleaningLog,
}

/// Apply the enabled operations to a table.
///
/// The log starts with the table's initial shape, followed by the lines of
/// each operation. Operations run in canonical order whatever order the set
/// was built in.
///
/// # Errors
///
/// [`TidyError::NoOperationSelected`] for an empty set, otherwise any failure
/// reported by an operation.
pub fn clean_table(df: DataFrame, operations: &OperationSet) -> Result<CleanOutcome> {
    if operations.is_empty() {
        return Err(TidyError::NoOperationSelected);
    }

    let mut log = CleaningLog::new();
    log.push(format!("Total columns: {}", df.width()));
    log.push(format!("Total rows: {}", df.height()));

    let mut table = df;
    let mut steps = Vec::with_capacity(operations.len());

    for op in operations {
        let rows_before = table.height();
        let columns_before = table.width();

        table = apply_operation(op, table, &mut log)
            .with_context(|| format!("Operation {op} failed"))?;

        let step = StepReport {
            operation: op,
            rows_before,
            rows_after: table.height(),
            columns_before,
            columns_after: table.width(),
        };
        tracing::debug!(
            "{op}: rows {} → {} ({} removed), columns {} → {}",
            step.rows_before,
            step.rows_after,
            step.rows_removed(),
            step.columns_before,
            step.columns_after
        );
        steps.push(step);
    }

    Ok(CleanOutcome { table, steps, log })
}

/// Append the closing summary lines of a run.
pub fn finish_log(log: &mut CleaningLog, output: &Path, table: &DataFrame) {
    log.push(format!("Cleaned CSV saved to {}", output.display()));
    log.push(format!("New number of rows: {}", table.height()));
    log.push(format!("New number of columns: {}", table.width()));
}

/// Load the input, clean it, write the output, and report what changed.
///
/// The request is validated first; an empty operation set fails before the
/// input is read and no output file is created.
///
/// # Errors
///
/// - [`TidyError::NoOperationSelected`] for an empty operation set
/// - [`TidyError::File`] when the input cannot be read or the output written
/// - [`TidyError::Parse`] when the input is not valid CSV
pub fn run_cleaning(request: &CleaningRequest) -> Result<RunReport> {
    validate_request(request)?;
    let start = std::time::Instant::now();

    tracing::info!(
        "Cleaning {} → {} with [{}]",
        request.input.display(),
        request.output.display(),
        request
            .operations
            .iter()
            .map(|op| op.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let df = load_table(&request.input, &request.load)?;
    let rows_before = df.height();
    let columns_before = df.width();

    let CleanOutcome {
        mut table,
        steps,
        mut log,
    } = clean_table(df, &request.operations)?;

    save_table(&mut table, &request.output, &request.write)?;
    finish_log(&mut log, &request.output, &table);

    let report = RunReport {
        input: request.input.clone(),
        output: request.output.clone(),
        rows_before,
        columns_before,
        rows_after: table.height(),
        columns_after: table.width(),
        steps,
        log,
        duration: start.elapsed(),
    };
    tracing::info!("{}", report.summary());

    Ok(report)
}
