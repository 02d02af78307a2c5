//! Cloud classification through Gemini's `generateContent` endpoint.

use super::types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use crate::ai::mime::resolve_image_mime;
use crate::ai::Classifier;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloud classifier backed by a Gemini multimodal model.
///
/// Every failure on the way to a non-empty answer surfaces as
/// [`Error::Classification`].
pub struct GeminiClassifier {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClassifier {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, Client::new())
    }

    /// `model` may be given bare (`gemini-1.5-flash`) or as `models/...`.
    pub fn new_with_client(api_key: String, model: String, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request(image: &[u8], mime_type: &str) -> GenerateContentRequest {
        use base64::Engine as _;
        let data = base64::engine::general_purpose::STANDARD.encode(image);

        // No output token cap: thinking models spend that budget before answering.
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: prompts::classification_prompt(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: resolve_image_mime(mime_type, image),
                            data,
                        },
                    },
                ],
            }],
        }
    }

    async fn send(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach Gemini: {}", e);
                Error::Classification(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read Gemini response: {}", e);
            Error::Classification(format!("Gemini response unreadable: {}", e))
        })?;

        if !status.is_success() {
            tracing::error!("Gemini API error (status {}): {}", status, body);
            return Err(Error::Classification(format!(
                "Gemini API error (status {})",
                status
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::Classification(format!("Unexpected Gemini response: {}", e))
        })
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(&self, image: &[u8], mime_type: &str) -> Result<String> {
        tracing::debug!(
            "Classifying cloud image ({} bytes, {}) via Gemini",
            image.len(),
            mime_type
        );

        let response = self.send(&Self::build_request(image, mime_type)).await?;

        let text = response
            .first_text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::Classification("No usable text in Gemini response".to_string())
            })?;

        Ok(text.to_string())
    }
}
