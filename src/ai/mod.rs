//! Access to the external multimodal generation capability.
//!
//! The orchestrator only sees these traits, so the Gemini REST client and the
//! scripted mock are interchangeable.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiGenerationClient;
pub use mock::{MockGenerationClient, MockResponse, RecordedCall};

use crate::request::InlineImage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Run one generation with `model` over the image and instruction text,
    /// returning the raw text output (possibly empty).
    async fn generate_text(&self, model: &str, image: &InlineImage, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait ModelCatalog: Send + Sync {
    /// Model identifiers visible to the configured credential.
    async fn list_models(&self) -> Result<Vec<String>>;
}
