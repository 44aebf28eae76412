//! Live share adapter that hands slide files to an external command.
//!
//! The command is configured as a single string such as `kdeconnect-cli --share`.
//! Slide files are written to a staging directory and their paths appended to the
//! command's arguments.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::SlideError;
use crate::ports::share::{ExportFile, ShareOutcome, ShareTarget};

/// Exit code shells use for Ctrl-C, and that share helpers use for "dismissed".
const CANCELLED_EXIT_CODE: i32 = 130;

/// Shares files by running a configured program.
#[derive(Debug, Clone)]
pub struct CommandShare {
    program: String,
    args: Vec<String>,
    staging_dir: PathBuf,
}

impl CommandShare {
    /// Parse a command line. Returns `None` for a blank command.
    #[must_use]
    pub fn from_command_line(command: &str, staging_dir: impl Into<PathBuf>) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect(), staging_dir: staging_dir.into() })
    }

    /// Where files are written before sharing.
    #[must_use]
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    fn stage(&self, files: &[ExportFile]) -> Result<Vec<PathBuf>, SlideError> {
        std::fs::create_dir_all(&self.staging_dir)?;
        files
            .iter()
            .map(|file| {
                let path = self.staging_dir.join(&file.name);
                std::fs::write(&path, &file.data)?;
                Ok::<_, SlideError>(path)
            })
            .collect()
    }
}

impl ShareTarget for CommandShare {
    fn is_available(&self, files: &[ExportFile]) -> bool {
        !files.is_empty()
    }

    fn share(&self, files: &[ExportFile]) -> Result<ShareOutcome, SlideError> {
        let paths = self.stage(files)?;
        tracing::debug!(program = %self.program, files = paths.len(), "running share command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(&paths)
            .output()
            .map_err(|e| SlideError::Export(format!("Failed to run '{}': {e}", self.program)))?;

        match output.status.code() {
            Some(0) => Ok(ShareOutcome::Shared),
            Some(CANCELLED_EXIT_CODE) | None => Ok(ShareOutcome::Cancelled),
            Some(code) => Err(SlideError::Export(format!(
                "'{}' exited with status {code}: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}
