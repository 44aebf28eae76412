//! Replaying adapter for the `TextGenerator` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::SlideError;
use crate::ports::text_generator::{GenerateFuture, TextGenerator, TextRequest, TextResponse};

/// Serves recorded text generation results from a cassette.
pub struct ReplayingTextGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingTextGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl TextGenerator for ReplayingTextGenerator {
    fn generate(&self, _request: &TextRequest) -> GenerateFuture<'_> {
        let output = next_output(&self.replayer, "text_generator", "generate");
        Box::pin(async move {
            let output = output.map_err(SlideError::Config)?;
            replay_result::<TextResponse>(output)
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::cassette::format::{Cassette, Interaction};

    fn generator(outputs: Vec<serde_json::Value>) -> ReplayingTextGenerator {
        let interactions = outputs
            .into_iter()
            .enumerate()
            .map(|(seq, output)| Interaction {
                seq: seq as u64,
                port: "text_generator".into(),
                method: "generate".into(),
                input: json!({}),
                output,
            })
            .collect();
        let cassette = Cassette {
            name: "t".into(),
            recorded_at: Utc::now(),
            commit: "c".into(),
            interactions,
        };
        ReplayingTextGenerator::new(Arc::new(Mutex::new(CassetteReplayer::new(cassette))))
    }

    fn request() -> TextRequest {
        TextRequest {
            model: "m".into(),
            prompt: "p".into(),
            temperature: 0.9,
            max_output_tokens: 1024,
        }
    }

    #[tokio::test]
    async fn replays_ok_then_err_then_runs_dry() {
        let generator = generator(vec![
            json!({"Ok": {"text": "[\"uno\"]"}}),
            json!({"Err": {"Upstream": {"status": 429, "body": "{\"error\":\"quota\"}"}}}),
        ]);

        assert_eq!(generator.generate(&request()).await.unwrap().text, "[\"uno\"]");

        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, SlideError::Upstream { status: 429, .. }));
        assert_eq!(err.upstream_detail().as_deref(), Some("{\"error\":\"quota\"}"));

        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, SlideError::Config(_)));
    }
}
