use super::{GenerationService, ModelCatalog};
use crate::request::InlineImage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted outcome for a single generation call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Text(String),
    /// Fails with `Error::AiProvider` carrying this message.
    Error(String),
}

/// A generation call as the mock received it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub image: InlineImage,
    pub prompt: String,
}

/// Scripted stand-in for the generation provider.
///
/// Scripted responses are consumed in call order; once they run out every call
/// returns a well-formed five-caption, five-song payload.
#[derive(Clone)]
pub struct MockGenerationClient {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    models: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            models: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Text(text.into()));
        self
    }

    pub fn with_error_response(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Error(message.into()));
        self
    }

    pub fn with_models(self, models: &[&str]) -> Self {
        self.models
            .lock()
            .unwrap()
            .extend(models.iter().map(|m| m.to_string()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Models requested so far, in call order.
    pub fn called_models(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.model.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The payload returned once the script is exhausted.
    pub fn default_content_json() -> String {
        let songs: Vec<serde_json::Value> = (1..=5)
            .map(|i| {
                serde_json::json!({
                    "title": format!("Song {}", i),
                    "artist": format!("Artist {}", i),
                    "lyric": format!("Lyric {}", i),
                    "youtube_link": format!("https://www.youtube.com/results?search_query=Song+{}", i)
                })
            })
            .collect();

        serde_json::json!({
            "captions": [
                "Golden hour, golden mood ✨",
                "Main character energy only",
                "Soft skies, loud heart",
                "Saving this view forever",
                "Vibes you can't fake 🌅"
            ],
            "songs": songs
        })
        .to_string()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate_text(&self, model: &str, image: &InlineImage, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            image: image.clone(),
            prompt: prompt.to_string(),
        });

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Error(message)) => Err(Error::AiProvider(message)),
            None => Ok(Self::default_content_json()),
        }
    }
}

#[async_trait]
impl ModelCatalog for MockGenerationClient {
    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.models.lock().unwrap().clone())
    }
}
