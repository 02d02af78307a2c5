//! AI service integration for cloud classification and cloud art generation
//!
//! A vision model (Gemini) names what a cloud looks like; a text-to-image
//! model (Hugging Face Inference API) paints that thing out of clouds.

pub mod gemini;
pub mod huggingface;
pub mod mime;
pub mod mock;

pub use gemini::GeminiClassifier;
pub use huggingface::HuggingFaceImageClient;
pub use mock::{MockClassifier, MockGenerationFailure, MockImageGenerator};

use crate::Result;
use async_trait::async_trait;

/// Names the single object a cloud photo most resembles.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Returns the model's raw answer. Callers trim and sanitize it.
    async fn classify(&self, image: &[u8], mime_type: &str) -> Result<String>;
}

/// Renders an image from a text prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>>;
}
