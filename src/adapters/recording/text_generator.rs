//! Recording adapter for the `TextGenerator` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::RecordedError;
use crate::ports::text_generator::{GenerateFuture, TextGenerator, TextRequest};

/// Records text generation interactions while delegating to an inner implementation.
pub struct RecordingTextGenerator {
    inner: Box<dyn TextGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTextGenerator {
    /// Creates a new recording generator wrapping the given implementation.
    pub fn new(inner: Box<dyn TextGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl TextGenerator for RecordingTextGenerator {
    fn generate(&self, request: &TextRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.generate(&request).await;
            let recorded = result.as_ref().map_err(RecordedError::from);
            record_result(&self.recorder, "text_generator", "generate", &request, &recorded);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::text_generator::ReplayingTextGenerator;
    use crate::cassette::replayer::CassetteReplayer;
    use crate::error::SlideError;
    use crate::ports::TextResponse;

    struct Echo;

    impl TextGenerator for Echo {
        fn generate(&self, request: &TextRequest) -> GenerateFuture<'_> {
            let text = request.prompt.clone();
            Box::pin(async move { Ok(TextResponse { text }) })
        }
    }

    struct RateLimited;

    impl TextGenerator for RateLimited {
        fn generate(&self, _request: &TextRequest) -> GenerateFuture<'_> {
            Box::pin(async {
                Err(SlideError::Upstream {
                    status: 429,
                    body: "{\"error\":{\"message\":\"quota\"}}".into(),
                })
            })
        }
    }

    #[tokio::test]
    async fn recorded_upstream_failure_replays_identically() {
        let path = std::env::temp_dir().join("carosello_recording_err_test/err.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&path, "err", "abc")));
        let generator = RecordingTextGenerator::new(Box::new(RateLimited), Arc::clone(&recorder));
        let request = TextRequest {
            model: "m".into(),
            prompt: "hello".into(),
            temperature: 0.9,
            max_output_tokens: 1024,
        };
        let live = generator.generate(&request).await.unwrap_err();
        recorder.lock().unwrap().write().unwrap();

        let replayer = CassetteReplayer::load(&path).unwrap();
        let replaying = ReplayingTextGenerator::new(Arc::new(Mutex::new(replayer)));
        let replayed = replaying.generate(&request).await.unwrap_err();

        assert!(matches!(replayed, SlideError::Upstream { status: 429, .. }));
        assert_eq!(replayed.upstream_detail(), live.upstream_detail());
        assert_eq!(replayed.to_string(), live.to_string());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn records_request_and_response() {
        let path = std::env::temp_dir().join("carosello_recording_test/rec.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&path, "rec", "abc")));
        let generator = RecordingTextGenerator::new(Box::new(Echo), Arc::clone(&recorder));

        let request = TextRequest {
            model: "m".into(),
            prompt: "hello".into(),
            temperature: 0.9,
            max_output_tokens: 1024,
        };
        let response = generator.generate(&request).await.unwrap();
        assert_eq!(response.text, "hello");

        drop(generator);
        let mut recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        assert_eq!(recorder.len(), 1);
        let written = recorder.write().unwrap();
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.contains("text_generator"));
        assert!(content.contains("hello"));

        let _ = std::fs::remove_dir_all(written.parent().unwrap());
    }
}
