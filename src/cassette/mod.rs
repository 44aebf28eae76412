//! YAML cassettes: recorded provider calls that tests and offline runs replay instead
//! of touching the network.

pub mod format;
pub mod recorder;
pub mod replayer;
