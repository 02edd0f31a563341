//! Ordered model fallback for content generation.
//!
//! Candidates are tried strictly in order, one attempt each. Any failure (call
//! error, empty output, unparsable output) moves on to the next candidate; the
//! first candidate whose output parses wins. Only the last failure is kept for
//! reporting.

use crate::ai::GenerationService;
use crate::models::GeneratedContent;
use crate::request::InlineImage;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

const PREVIEW_CHARS: usize = 100;

pub struct FallbackOrchestrator {
    service: Arc<dyn GenerationService>,
    candidates: Vec<String>,
    rate_limit_delay: Duration,
    strict_output: bool,
}

impl FallbackOrchestrator {
    pub fn new(service: Arc<dyn GenerationService>, candidates: Vec<String>) -> Self {
        Self {
            service,
            candidates,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            strict_output: false,
        }
    }

    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// Treat output without exactly 5 captions and 5 songs as a model failure.
    pub fn with_strict_output(mut self, strict: bool) -> Self {
        self.strict_output = strict;
        self
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Try each candidate in turn until one yields parseable content.
    ///
    /// Returns `Error::AllCandidatesExhausted` carrying the last failure's
    /// description when none does.
    pub async fn generate(&self, image: &InlineImage, prompt: &str) -> Result<GeneratedContent> {
        let mut last_error: Option<Error> = None;

        for (index, model) in self.candidates.iter().enumerate() {
            info!("Attempting generation with model: {}", model);

            match self.attempt(model, image, prompt).await {
                Ok(content) => {
                    info!("Generation succeeded with model: {}", model);
                    return Ok(content);
                }
                Err(e) => {
                    warn!("Generation failed with model {}: {}", model, e);
                    let has_next = index + 1 < self.candidates.len();
                    if e.is_rate_limited() && has_next {
                        info!(
                            "Rate limited; waiting {:?} before the next model",
                            self.rate_limit_delay
                        );
                        tokio::time::sleep(self.rate_limit_delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        let details = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        error!("All models failed. Last error: {}", details);
        Err(Error::AllCandidatesExhausted { details })
    }

    async fn attempt(
        &self,
        model: &str,
        image: &InlineImage,
        prompt: &str,
    ) -> Result<GeneratedContent> {
        let text = self.service.generate_text(model, image, prompt).await?;
        if text.is_empty() {
            return Err(Error::ModelOutputEmpty {
                model: model.to_string(),
            });
        }

        let content = parse_content(model, &text)?;

        let issues = content.cardinality_issues();
        if !issues.is_empty() {
            let reason = issues.join("; ");
            if self.strict_output {
                return Err(Error::ModelOutputRejected {
                    model: model.to_string(),
                    reason,
                });
            }
            warn!("Model {} output relayed despite: {}", model, reason);
        }

        Ok(content)
    }
}

/// Parse model output as [`GeneratedContent`] after removing any markdown fence.
pub fn parse_content(model: &str, text: &str) -> Result<GeneratedContent> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned).map_err(|e| {
        let preview: String = text.chars().take(PREVIEW_CHARS).collect();
        error!("Failed to parse JSON from {}: {}...", model, preview);
        Error::ModelOutputUnparsable {
            model: model.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Strip a leading ```` ``` ```` / ```` ```json ```` marker and a trailing
/// ```` ``` ```` marker, plus surrounding whitespace.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockGenerationClient;
    use pretty_assertions::assert_eq;

    const VALID: &str = r#"{"captions": ["a", "b", "c", "d", "e"], "songs": [
        {"title": "t1", "artist": "a1", "lyric": "l1", "youtube_link": "y1"},
        {"title": "t2", "artist": "a2", "lyric": "l2", "youtube_link": "y2"},
        {"title": "t3", "artist": "a3", "lyric": "l3", "youtube_link": "y3"},
        {"title": "t4", "artist": "a4", "lyric": "l4", "youtube_link": "y4"},
        {"title": "t5", "artist": "a5", "lyric": "l5", "youtube_link": "y5"}
    ]}"#;

    fn image() -> InlineImage {
        InlineImage {
            mime_type: "image/jpeg".to_string(),
            data: "AAAA".to_string(),
        }
    }

    fn candidates() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    fn orchestrator(mock: &MockGenerationClient) -> FallbackOrchestrator {
        FallbackOrchestrator::new(Arc::new(mock.clone()), candidates())
    }

    #[test]
    fn test_candidates_keep_configured_order() {
        let mock = MockGenerationClient::new();
        assert_eq!(orchestrator(&mock).candidates(), ["A", "B", "C"]);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_fenced_content() {
        let fenced = format!("```json\n{}\n```", VALID);
        let content = parse_content("m", &fenced).unwrap();
        assert_eq!(content.captions.len(), 5);
        assert_eq!(content.songs[4].title(), Some("t5"));
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = parse_content("m", "Sure! Here are your captions").unwrap_err();
        assert!(matches!(err, Error::ModelOutputUnparsable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_through_error_and_garbage_to_third_model() {
        let mock = MockGenerationClient::new()
            .with_error_response("Gemini API error (status 404 Not Found): no such model")
            .with_text_response("this is not json")
            .with_text_response(VALID);

        let start = tokio::time::Instant::now();
        let content = orchestrator(&mock).generate(&image(), "p").await.unwrap();

        assert_eq!(content.captions, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(mock.called_models(), vec!["A", "B", "C"]);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_stops_the_loop() {
        let mock = MockGenerationClient::new().with_text_response(VALID);

        orchestrator(&mock).generate(&image(), "p").await.unwrap();
        assert_eq!(mock.get_call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_inserts_delay_before_next_model() {
        let mock = MockGenerationClient::new()
            .with_error_response("Gemini API error (status 429 Too Many Requests): quota")
            .with_text_response(VALID);

        let start = tokio::time::Instant::now();
        orchestrator(&mock).generate(&image(), "p").await.unwrap();

        assert!(start.elapsed() >= DEFAULT_RATE_LIMIT_DELAY);
        assert_eq!(mock.called_models(), vec!["A", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_output_falls_back_without_delay() {
        let mock = MockGenerationClient::new()
            .with_text_response("")
            .with_text_response(VALID);

        let start = tokio::time::Instant::now();
        orchestrator(&mock).generate(&image(), "p").await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(mock.get_call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_last_error() {
        let mock = MockGenerationClient::new()
            .with_error_response("first failure")
            .with_text_response("")
            .with_error_response("final failure from C");

        let err = orchestrator(&mock).generate(&image(), "p").await.unwrap_err();

        match err {
            Error::AllCandidatesExhausted { details } => {
                assert!(details.contains("final failure from C"));
                assert!(!details.contains("first failure"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(mock.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_exhausted() {
        let mock = MockGenerationClient::new();
        let orchestrator = FallbackOrchestrator::new(Arc::new(mock.clone()), Vec::new());

        let err = orchestrator.generate(&image(), "p").await.unwrap_err();
        assert!(matches!(
            err,
            Error::AllCandidatesExhausted { ref details } if details == "Unknown error"
        ));
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loose_cardinality_is_relayed() {
        let mock =
            MockGenerationClient::new().with_text_response(r#"{"captions": ["x"], "songs": []}"#);

        let content = orchestrator(&mock).generate(&image(), "p").await.unwrap();
        assert_eq!(content.captions, vec!["x"]);
        assert!(content.songs.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_cardinality_falls_back() {
        let mock = MockGenerationClient::new()
            .with_text_response(r#"{"captions": ["x"], "songs": []}"#)
            .with_text_response(VALID);

        let content = orchestrator(&mock)
            .with_strict_output(true)
            .generate(&image(), "p")
            .await
            .unwrap();
        assert_eq!(content.captions.len(), 5);
        assert_eq!(mock.called_models(), vec!["A", "B"]);
    }
}
