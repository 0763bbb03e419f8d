//! # tidycsv - CSV cleaning with a change log
//!
//! tidycsv loads a CSV file into a polars `DataFrame`, applies a chosen
//! subset of five cleaning operations, writes the result back to CSV and
//! returns a human-readable log of what each step changed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tidycsv::pipeline::{CleaningRequest, OperationSet, run_cleaning};
//!
//! let request = CleaningRequest::new("raw.csv", "clean.csv", OperationSet::all());
//! let report = run_cleaning(&request)?;
//! println!("{}", report.log.to_text());
//! # Ok::<(), tidycsv::error::TidyError>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`pipeline`]: operations, the executor and run reports
//! - [`table`]: CSV loading and atomic CSV writing
//! - [`config`]: persisted user settings
//! - [`error`]: error type and context helpers
//! - [`logging`]: console and rolling-file tracing setup

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod table;
