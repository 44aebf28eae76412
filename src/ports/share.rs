//! Share port: hands finished slide images to a platform share capability.
//!
//! The trait is synchronous on purpose. Some share integrations revoke their
//! grant if anything else runs between producing the files and the share call,
//! so callers must not be able to suspend in between.

use crate::error::SlideError;

/// A named, encoded image ready to leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// File name, e.g. `slide_01.jpg`.
    pub name: String,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

impl ExportFile {
    /// Name a slide by its zero-based position: `slide_01.jpg`, `slide_02.jpg`, ...
    #[must_use]
    pub fn slide(index: usize, data: Vec<u8>) -> Self {
        Self { name: format!("slide_{:02}.jpg", index + 1), data }
    }
}

/// How a share attempt ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The files were handed over.
    Shared,
    /// The user dismissed the share sheet. Not an error.
    Cancelled,
}

/// A native multi-file share capability.
pub trait ShareTarget: Send + Sync {
    /// Whether this target can take these files right now.
    fn is_available(&self, files: &[ExportFile]) -> bool;

    /// Share the files.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than user cancellation.
    fn share(&self, files: &[ExportFile]) -> Result<ShareOutcome, SlideError>;
}
