//! Recording adapters that capture interactions to cassettes.

pub mod text_generator;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

/// Record a `Result<T, E>` interaction using the Ok/Err JSON convention. Both sides
/// keep their serialized structure.
///
/// Recording is best effort: a value that cannot be serialized is logged and skipped.
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: Serialize,
    I: Serialize,
{
    let output = match result {
        Ok(v) => serde_json::to_value(v).map(|inner| serde_json::json!({ "Ok": inner })),
        Err(e) => serde_json::to_value(e).map(|inner| serde_json::json!({ "Err": inner })),
    };

    match (serde_json::to_value(input), output) {
        (Ok(input_json), Ok(output_json)) => match recorder.lock() {
            Ok(mut guard) => guard.record(port, method, input_json, output_json),
            Err(e) => tracing::warn!("recorder lock poisoned: {e}"),
        },
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(port, method, "skipping unserializable interaction: {e}");
        }
    }
}
