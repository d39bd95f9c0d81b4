//! Subcommand implementations

pub(crate) mod inspect;
pub(crate) mod run;

use crate::error::{CliError, Result};
use std::path::Path;

/// Fails early with a clear error when an input path is missing or not a file.
pub(crate) fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}
