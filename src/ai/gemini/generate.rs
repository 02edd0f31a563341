use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, InlineData, Part};
use crate::ai::{GenerationService, ModelCatalog};
use crate::request::InlineImage;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

pub struct GeminiGenerationClient {
    http: GeminiHttpClient,
}

impl GeminiGenerationClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, Duration::from_secs(60), client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl GenerationService for GeminiGenerationClient {
    async fn generate_text(&self, model: &str, image: &InlineImage, prompt: &str) -> Result<String> {
        tracing::debug!(
            "Sending {} image ({} base64 chars) to Gemini model {}",
            image.mime_type,
            image.data.len(),
            model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                    Part::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        };

        let response = self.http.generate_content(model, &request).await?;
        Ok(response.text())
    }
}

#[async_trait]
impl ModelCatalog for GeminiGenerationClient {
    async fn list_models(&self) -> Result<Vec<String>> {
        self.http.list_models().await
    }
}
