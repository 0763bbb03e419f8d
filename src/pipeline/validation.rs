//! Request validation.
//!
//! Runs before any file is touched, so a rejected request never reads the
//! input or creates the output.

use super::spec::CleaningRequest;
use crate::error::{Result, TidyError};

/// Check that a request can be executed.
///
/// # Errors
///
/// - [`TidyError::NoOperationSelected`] when the operation set is empty
/// - [`TidyError::File`] when a path is empty or the output is a directory
pub fn validate_request(request: &CleaningRequest) -> Result<()> {
    if request.operations.is_empty() {
        return Err(TidyError::NoOperationSelected);
    }

    if request.input.as_os_str().is_empty() {
        return Err(TidyError::File("No input file provided".to_owned()));
    }

    if request.output.as_os_str().is_empty() {
        return Err(TidyError::File("No output file provided".to_owned()));
    }

    if request.output.is_dir() {
        return Err(TidyError::File(format!(
            "Output path {} is a directory",
            request.output.display()
        )));
    }

    Ok(())
}
