//! Live adapter for the Gemini text generation API.

use reqwest::Client;
use serde::Deserialize;

use crate::error::SlideError;
use crate::ports::text_generator::{GenerateFuture, TextGenerator, TextRequest, TextResponse};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live Gemini text generator that calls the Google AI API.
pub struct GeminiTextGenerator {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiTextGenerator {
    /// Create a new Gemini generator with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Point the generator at another endpoint root (used by tests).
    #[must_use]
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self { client: Client::new(), api_key, base_url: base_url.into() }
    }
}

impl TextGenerator for GeminiTextGenerator {
    fn generate(&self, request: &TextRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let url = format!("{}/{}:generateContent", self.base_url, request.model);

            let body = serde_json::json!({
                "contents": [{
                    "parts": [{"text": request.prompt}]
                }],
                "generationConfig": {
                    "temperature": request.temperature,
                    "maxOutputTokens": request.max_output_tokens,
                }
            });

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                tracing::error!(status = status.as_u16(), body = %response_text, "Gemini error");
                return Err(SlideError::Upstream { status: status.as_u16(), body: response_text });
            }

            let parsed: GeminiResponse = serde_json::from_str(&response_text)
                .map_err(|e| {
                    SlideError::MalformedResponse(format!("Failed to parse response: {e}"))
                })?;

            let text = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .and_then(|c| c.parts.into_iter().next())
                .and_then(|p| p.text)
                .unwrap_or_default();

            Ok(TextResponse { text })
        })
    }
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}
