//! Implementations of the port traits.
//!
//! `live` talks to Gemini and the share command, `recording` wraps a live generator
//! and writes a cassette, and `replaying` serves one back.

pub mod live;
pub mod recording;
pub mod replaying;
