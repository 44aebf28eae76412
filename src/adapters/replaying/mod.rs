//! Replaying adapters that serve recorded interactions from cassettes.

pub mod text_generator;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;
use crate::error::{RecordedError, SlideError};

/// Retrieve the next recorded output for a given port and method.
///
/// # Errors
///
/// Returns an error if the cassette has no more interactions for the pair.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, String> {
    let mut guard = replayer.lock().map_err(|e| format!("replayer lock poisoned: {e}"))?;
    guard.next_interaction(port, method).map(|i| i.output)
}

/// Deserialize a replayed output as the recorded success value or error.
///
/// An `Err` that is a bare string is a hand-written message and replays as an
/// upstream failure with that message as its body.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, SlideError> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let recorded = match err_val {
            serde_json::Value::String(message) => RecordedError::Network(message.clone()),
            other => serde_json::from_value(other.clone()).map_err(|e| {
                SlideError::Config(format!("Unreadable replayed error: {e}"))
            })?,
        };
        return Err(recorded.into());
    }
    let value = output.get("Ok").or_else(|| output.get("ok")).cloned().unwrap_or(output);
    serde_json::from_value(value)
        .map_err(|e| SlideError::Config(format!("Unreadable replayed output: {e}")))
}
