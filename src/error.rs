//! Centralized error handling for tidycsv.
//!
//! Every fallible library operation returns [`Result`], whose error side is
//! [`TidyError`]. The variants mirror the ways a cleaning run can fail:
//!
//! ```
//! use tidycsv::error::TidyError;
//!
//! fn describe(err: &TidyError) -> &'static str {
//!     match err {
//!         TidyError::File(_) | TidyError::Io(_) => "could not read or write a file",
//!         TidyError::Parse(_) => "input is not valid CSV",
//!         TidyError::NoOperationSelected => "nothing to do",
//!         _ => "cleaning failed",
//!     }
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts into
//! [`TidyError`]:
//!
//! ```no_run
//! use tidycsv::error::ResultExt as _;
//!
//! fn read_settings() -> tidycsv::error::Result<String> {
//!     std::fs::read_to_string("config.json").context("Failed to read settings")
//! }
//! ```

use std::fmt;

/// Main error type for tidycsv operations.
#[derive(Debug)]
pub enum TidyError {
    /// Input missing or unreadable, output not writable
    File(String),

    /// Input is not well-formed delimited text
    Parse(String),

    /// The run was requested with an empty operation set
    NoOperationSelected,

    /// A cleaning step failed inside polars
    DataProcessing(String),

    /// Settings file could not be read or written
    Config(String),

    /// Raw I/O errors
    Io(std::io::Error),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for TidyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(msg) => write!(f, "File error: {msg}"),
            Self::Parse(msg) => write!(f, "Parse error: {msg}"),
            Self::NoOperationSelected => write!(
                f,
                "No operation selected. Please choose at least one operation."
            ),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TidyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TidyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for TidyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for TidyError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<TidyError> for String {
    fn from(err: TidyError) -> Self {
        err.to_string()
    }
}

/// Result type alias for tidycsv operations.
pub type Result<T> = std::result::Result<T, TidyError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TidyError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: TidyError = e.into();
            err.with_prefix(msg.into())
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: TidyError = e.into();
            err.with_prefix(f())
        })
    }
}

impl TidyError {
    /// Prefix the message. `File`, `Parse`, `DataProcessing` and `Config`
    /// keep their variant.
    fn with_prefix(self, prefix: String) -> Self {
        match self {
            Self::File(msg) => Self::File(format!("{prefix}: {msg}")),
            Self::Parse(msg) => Self::Parse(format!("{prefix}: {msg}")),
            Self::DataProcessing(msg) => Self::DataProcessing(format!("{prefix}: {msg}")),
            Self::Config(msg) => Self::Config(format!("{prefix}: {msg}")),
            Self::NoOperationSelected => Self::NoOperationSelected,
            other @ (Self::Io(_) | Self::Other(_)) => Self::Other(format!("{prefix}: {other}")),
        }
    }
}
