//! Live adapters that talk to real services.

pub mod command_share;
pub mod gemini;
