//! Cleaning request data structures.
//!
//! A [`CleaningRequest`] names the input and output files and the set of
//! enabled [`Operation`]s. Requests serialize to JSON so a run can be saved
//! and replayed from the CLI.

use crate::error::{Result, ResultExt as _, TidyError};
use crate::table::{LoadOptions, WriteOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One of the five cleaning transformations.
///
/// Variants are declared in canonical order; `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Drop rows containing any missing cell
    RemoveNull,
    /// Turn exact `"NA"` text into missing, then drop rows containing any missing cell
    RemoveNa,
    /// Drop rows that repeat an earlier row, keeping the first
    RemoveDuplicates,
    /// Strip everything but word characters and whitespace from text cells and headers
    CleanSpecialChars,
    /// Drop rows outside the 1.5 IQR fence, one numeric column at a time
    HandleOutliers,
}

impl Operation {
    /// Every operation, in canonical order.
    pub const ALL: [Self; 5] = [
        Self::RemoveNull,
        Self::RemoveNa,
        Self::RemoveDuplicates,
        Self::CleanSpecialChars,
        Self::HandleOutliers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoveNull => "remove_null",
            Self::RemoveNa => "remove_na",
            Self::RemoveDuplicates => "remove_duplicates",
            Self::CleanSpecialChars => "clean_special_chars",
            Self::HandleOutliers => "handle_outliers",
        }
    }

    /// Label shown next to the option in user interfaces.
    pub fn label(self) -> &'static str {
        match self {
            Self::RemoveNull => "Remove Null Values",
            Self::RemoveNa => "Remove 'NA' Values",
            Self::RemoveDuplicates => "Remove Duplicate Rows",
            Self::CleanSpecialChars => "Clean Special Characters",
            Self::HandleOutliers => "Handle Outliers",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = TidyError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == wanted)
            .ok_or_else(|| {
                TidyError::Config(format!(
                    "Unknown operation '{wanted}' (expected one of: {})",
                    Self::ALL.map(Self::as_str).join(", ")
                ))
            })
    }
}

/// The enabled operations of a run.
///
/// Iteration always yields canonical order, whatever order operations were
/// added in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationSet(BTreeSet<Operation>);

impl OperationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// All five operations.
    pub fn all() -> Self {
        Operation::ALL.into_iter().collect()
    }

    /// Returns `false` if the operation was already enabled.
    pub fn insert(&mut self, op: Operation) -> bool {
        self.0.insert(op)
    }

    pub fn contains(&self, op: Operation) -> bool {
        self.0.contains(&op)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Operation> for OperationSet {
    fn extend<I: IntoIterator<Item = Operation>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a OperationSet {
    type Item = Operation;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, Operation>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

/// Everything needed for one load → clean → write run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningRequest {
    /// CSV file to read
    pub input: PathBuf,

    /// Destination of the cleaned CSV
    pub output: PathBuf,

    /// Enabled operations
    pub operations: OperationSet,

    #[serde(default)]
    pub load: LoadOptions,

    #[serde(default)]
    pub write: WriteOptions,
}

impl CleaningRequest {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        operations: OperationSet,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            operations,
            load: LoadOptions::default(),
            write: WriteOptions::default(),
        }
    }

    /// Load a request from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`TidyError::Config`] if its content is not a valid request.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read request file {}", path.as_ref().display()))?;
        Self::from_json(&content)
    }

    /// Parse a request from a JSON string
    ///
    /// # Errors
    ///
    /// Returns [`TidyError::Config`] for malformed JSON or an unknown operation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse cleaning request JSON")
    }

    /// Serialize the request to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns [`TidyError::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize cleaning request")
    }

    /// Save the request to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).context("Failed to write request file")
    }
}
