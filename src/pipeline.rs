//! The cleaning pipeline.
//!
//! A run takes an input CSV, an output path and an [`OperationSet`], and
//! applies the enabled operations in a fixed canonical order:
//!
//! 1. `remove_null`: drop rows with any missing cell
//! 2. `remove_na`: treat exact `"NA"` text as missing, then drop rows with any missing cell
//! 3. `remove_duplicates`: drop repeated rows, keeping the first
//! 4. `clean_special_chars`: strip punctuation and symbols from text cells and headers
//! 5. `handle_outliers`: drop rows outside the 1.5 IQR fence, one numeric column at a time
//!
//! # Example
//!
//! ```no_run
//! use tidycsv::pipeline::{CleaningRequest, Operation, OperationSet, run_cleaning};
//!
//! let ops: OperationSet = [Operation::RemoveDuplicates, Operation::RemoveNull]
//!     .into_iter()
//!     .collect();
//! let report = run_cleaning(&CleaningRequest::new("data.csv", "clean.csv", ops))?;
//! for line in report.log.lines() {
//!     println!("{line}");
//! }
//! # Ok::<(), tidycsv::error::TidyError>(())
//! ```

pub mod executor;
pub mod report;
pub mod spec;
pub mod steps;
pub mod validation;

pub use executor::{CleanOutcome, clean_table, finish_log, run_cleaning};
pub use report::{CleaningLog, RunReport, StepReport};
pub use spec::{CleaningRequest, Operation, OperationSet};
pub use steps::{OutlierFence, apply_operation, strip_special_chars};
pub use validation::validate_request;
