//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`.

pub mod share;
pub mod text_generator;

pub use share::{ExportFile, ShareOutcome, ShareTarget};
pub use text_generator::{TextGenerator, TextRequest, TextResponse};
