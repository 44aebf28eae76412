//! Phrase generation: prompt composition, dispatch and reply parsing.

use serde_json::Value;

use crate::error::SlideError;
use crate::ports::{TextGenerator, TextRequest};

/// Most phrases a generation returns.
pub const MAX_PHRASES: usize = 10;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.9;

/// Output token ceiling sent with every request.
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Appended to the style instructions so the model answers machine-readably.
pub const JSON_INSTRUCTION: &str = "\n\nRespond ONLY with a valid JSON array of exactly 10 \
    strings, with no other text, no backticks and no markdown. \
    Example: [\"phrase 1\", \"phrase 2\", ..., \"phrase 10\"]";

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    style_instructions: String,
    topic: Option<String>,
}

impl GenerationRequest {
    /// Build a request. A blank topic counts as no topic.
    ///
    /// # Errors
    ///
    /// Returns an error if `style_instructions` is empty.
    pub fn new(
        style_instructions: impl Into<String>,
        topic: Option<String>,
    ) -> Result<Self, SlideError> {
        let style_instructions = style_instructions.into();
        if style_instructions.is_empty() {
            return Err(SlideError::InvalidArgument("Missing systemPrompt".into()));
        }
        let topic = topic.filter(|t| !t.trim().is_empty());
        Ok(Self { style_instructions, topic })
    }

    /// The style instructions.
    #[must_use]
    pub fn style_instructions(&self) -> &str {
        &self.style_instructions
    }

    /// The optional extra topic.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }
}

/// Build the single prompt sent to the provider.
#[must_use]
pub fn compose_prompt(request: &GenerationRequest) -> String {
    match request.topic() {
        Some(topic) => format!(
            "{}{JSON_INSTRUCTION}\n\nAdditional topic or context: {topic}",
            request.style_instructions
        ),
        None => format!("{}{JSON_INSTRUCTION}", request.style_instructions),
    }
}

/// Phrases extracted from a provider reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phrases {
    /// The reply was a clean JSON array.
    Structured(Vec<String>),
    /// The reply was salvaged line by line.
    Recovered(Vec<String>),
}

impl Phrases {
    /// The phrases, however they were obtained.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Structured(p) | Self::Recovered(p) => p,
        }
    }

    /// Consume into the phrase list.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Structured(p) | Self::Recovered(p) => p,
        }
    }

    /// Whether the line-based fallback was needed.
    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }
}

/// Remove surrounding whitespace and a Markdown code fence, if any.
#[must_use]
pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = text.strip_prefix("```json").or_else(|| text.strip_prefix("```")).unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Parse a provider reply. Never fails: anything that is not a JSON array goes
/// through line recovery, which may yield an empty list.
#[must_use]
pub fn parse_phrases(raw: &str) -> Phrases {
    let cleaned = strip_fences(raw);
    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Array(items)) => {
            Phrases::Structured(
                items.into_iter().filter_map(phrase_text).take(MAX_PHRASES).collect(),
            )
        }
        _ => Phrases::Recovered(recover_lines(cleaned)),
    }
}

fn phrase_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn recover_lines(text: &str) -> Vec<String> {
    text.lines().map(clean_line).filter(|l| !l.is_empty()).take(MAX_PHRASES).collect()
}

/// Strip list markers and quote/comma debris from one line.
fn clean_line(line: &str) -> String {
    let line = line.trim_start_matches(|c: char| {
        c.is_ascii_digit() || matches!(c, '-' | '.' | '*' | '"') || c.is_whitespace()
    });
    let line = line.strip_suffix("\",").unwrap_or(line);
    let line = line.strip_prefix('"').unwrap_or(line);
    let line = line.strip_suffix('"').unwrap_or(line);
    line.trim().to_string()
}

/// Ask the provider for phrases. One call, no retries.
///
/// # Errors
///
/// Returns the provider's error unchanged; parsing itself cannot fail.
pub async fn generate_phrases(
    generator: &dyn TextGenerator,
    model: &str,
    request: &GenerationRequest,
) -> Result<Phrases, SlideError> {
    let text_request = TextRequest {
        model: model.to_string(),
        prompt: compose_prompt(request),
        temperature: TEMPERATURE,
        max_output_tokens: MAX_OUTPUT_TOKENS,
    };

    let response = generator.generate(&text_request).await?;
    let phrases = parse_phrases(&response.text);
    if phrases.is_recovered() {
        tracing::warn!(
            count = phrases.as_slice().len(),
            "provider reply was not a JSON array; recovered phrases line by line"
        );
    } else {
        tracing::debug!(count = phrases.as_slice().len(), "parsed phrases");
    }
    Ok(phrases)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ports::text_generator::{GenerateFuture, TextResponse};

    #[test]
    fn empty_style_is_rejected() {
        assert!(GenerationRequest::new("", None).is_err());
    }

    #[test]
    fn prompt_without_topic() {
        let request = GenerationRequest::new("Be witty.", None).unwrap();
        let prompt = compose_prompt(&request);
        assert!(prompt.starts_with("Be witty.\n\nRespond ONLY with a valid JSON array"));
        assert!(!prompt.contains("Additional topic"));
    }

    #[test]
    fn prompt_with_topic() {
        let request = GenerationRequest::new("Be witty.", Some("monday".into())).unwrap();
        let prompt = compose_prompt(&request);
        assert!(prompt.contains(JSON_INSTRUCTION));
        assert!(prompt.ends_with("\n\nAdditional topic or context: monday"));
    }

    #[test]
    fn blank_topic_is_dropped() {
        let request = GenerationRequest::new("Be witty.", Some("   ".into())).unwrap();
        assert!(request.topic().is_none());
    }

    #[test]
    fn fenced_json_array() {
        let phrases = parse_phrases("```json\n[\"a\",\"b\",\"c\"]\n```");
        assert_eq!(phrases, Phrases::Structured(vec!["a".into(), "b".into(), "c".into()]));
    }

    #[test]
    fn bare_fence_without_language() {
        let phrases = parse_phrases("```\n[\"x\"]\n```");
        assert_eq!(phrases, Phrases::Structured(vec!["x".into()]));
    }

    #[test]
    fn empty_array_is_preserved() {
        assert_eq!(parse_phrases("[]"), Phrases::Structured(vec![]));
    }

    #[test]
    fn structured_is_capped_at_ten() {
        let items: Vec<String> = (1..=14).map(|i| format!("\"p{i}\"")).collect();
        let phrases = parse_phrases(&format!("[{}]", items.join(",")));
        assert!(!phrases.is_recovered());
        assert_eq!(phrases.as_slice().len(), MAX_PHRASES);
        assert_eq!(phrases.as_slice()[9], "p10");
    }

    #[test]
    fn non_string_elements() {
        let phrases = parse_phrases(r#"["a", 2, true, null, {"x": 1}, ["y"]]"#);
        assert_eq!(phrases.into_vec(), vec!["a", "2", "true"]);
    }

    #[test]
    fn numbered_list_is_recovered() {
        let phrases = parse_phrases("1. \"first one\"\n2. \"second one\"\ngarbage");
        assert_eq!(
            phrases,
            Phrases::Recovered(vec!["first one".into(), "second one".into(), "garbage".into()])
        );
    }

    #[test]
    fn broken_json_lines_are_cleaned() {
        let phrases = parse_phrases("[\n  \"alpha\",\n  \"beta\",\n  \"gamma\"\n");
        assert_eq!(phrases.into_vec(), vec!["[", "alpha", "beta", "gamma"]);
    }

    #[test]
    fn bullets_and_blank_lines() {
        let phrases = parse_phrases("- uno\n\n* due\n   \n-- tre\r\n");
        assert_eq!(phrases, Phrases::Recovered(vec!["uno".into(), "due".into(), "tre".into()]));
    }

    #[test]
    fn recovery_is_capped_at_ten() {
        let text: Vec<String> = (1..=25).map(|i| format!("line {i}")).collect();
        let phrases = parse_phrases(&text.join("\n"));
        assert!(phrases.is_recovered());
        assert_eq!(phrases.as_slice().len(), MAX_PHRASES);
    }

    #[test]
    fn json_object_falls_back() {
        let phrases = parse_phrases(r#"{"phrases": ["a"]}"#);
        assert!(phrases.is_recovered());
    }

    #[test]
    fn empty_reply_recovers_to_nothing() {
        assert_eq!(parse_phrases(""), Phrases::Recovered(vec![]));
    }

    struct CannedGenerator {
        reply: Result<String, u16>,
        seen: Mutex<Vec<TextRequest>>,
    }

    impl TextGenerator for CannedGenerator {
        fn generate(&self, request: &TextRequest) -> GenerateFuture<'_> {
            self.seen.lock().unwrap().push(request.clone());
            let reply = self.reply.clone();
            Box::pin(async move {
                reply
                    .map(|text| TextResponse { text })
                    .map_err(|status| SlideError::Upstream { status, body: "nope".into() })
            })
        }
    }

    #[tokio::test]
    async fn generate_sends_fixed_parameters() {
        let generator =
            CannedGenerator { reply: Ok("[\"uno\",\"due\"]".into()), seen: Mutex::new(vec![]) };
        let request = GenerationRequest::new("Style.", Some("topic".into())).unwrap();

        let phrases = generate_phrases(&generator, "some-model", &request).await.unwrap();
        assert_eq!(phrases, Phrases::Structured(vec!["uno".into(), "due".into()]));

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "some-model");
        assert!((seen[0].temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(seen[0].max_output_tokens, 1024);
        assert_eq!(seen[0].prompt, compose_prompt(&request));
    }

    #[tokio::test]
    async fn upstream_errors_skip_parsing() {
        let generator = CannedGenerator { reply: Err(503), seen: Mutex::new(vec![]) };
        let request = GenerationRequest::new("Style.", None).unwrap();
        let err = generate_phrases(&generator, "m", &request).await.unwrap_err();
        assert!(matches!(err, SlideError::Upstream { status: 503, .. }));
    }
}
