use crate::ai::ImageGenerator;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Text-to-image client for the Hugging Face Inference API.
///
/// The endpoint answers a successful request with raw image bytes.
pub struct HuggingFaceImageClient {
    client: Client,
    token: String,
    model_url: String,
    timeout: Duration,
}

impl HuggingFaceImageClient {
    pub fn new(token: String, model_url: String) -> Self {
        Self::new_with_client(token, model_url, Client::new())
    }

    pub fn new_with_client(token: String, model_url: String, client: Client) -> Self {
        Self {
            client,
            token,
            model_url,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn model_url(&self) -> &str {
        &self.model_url
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn unreachable(e: reqwest::Error) -> Error {
        tracing::error!("Hugging Face request failed: {}", e);
        Error::GenerationUnreachable(e.to_string())
    }
}

#[async_trait]
impl ImageGenerator for HuggingFaceImageClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        tracing::debug!("Requesting cloud art from Hugging Face ({} chars)", prompt.len());

        let response = self
            .client
            .post(&self.model_url)
            .timeout(self.timeout)
            .bearer_auth(&self.token)
            .json(&InferenceRequest { inputs: prompt })
            .send()
            .await
            .map_err(Self::unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Hugging Face API error: {} - {}", status, error_text);
            return Err(Error::GenerationUnavailable(format!(
                "Hugging Face API error (status {})",
                status
            )));
        }

        let bytes = response.bytes().await.map_err(Self::unreachable)?;
        if bytes.is_empty() {
            tracing::error!("Hugging Face returned an empty body");
            return Err(Error::GenerationUnavailable(
                "Empty image body from Hugging Face".to_string(),
            ));
        }

        Ok(bytes.to_vec())
    }
}
