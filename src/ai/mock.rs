use super::{Classifier, ImageGenerator};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted [`Classifier`] for tests. Cycles through its labels.
#[derive(Clone)]
pub struct MockClassifier {
    labels: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
    seen_mime_types: Arc<Mutex<Vec<String>>>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            labels: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
            seen_mime_types: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_label(self, label: &str) -> Self {
        self.labels.lock().unwrap().push(label.to_string());
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_seen_mime_types(&self) -> Vec<String> {
        self.seen_mime_types.lock().unwrap().clone()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, _image: &[u8], mime_type: &str) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.seen_mime_types
            .lock()
            .unwrap()
            .push(mime_type.to_string());

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::Classification(message));
        }

        let labels = self.labels.lock().unwrap();
        if labels.is_empty() {
            Ok("dragon".to_string())
        } else {
            let index = (*count - 1) % labels.len();
            Ok(labels[index].clone())
        }
    }
}

/// How a [`MockImageGenerator`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockGenerationFailure {
    /// Upstream answered with a non-success status.
    Unavailable,
    /// Upstream could not be reached or timed out.
    Unreachable,
}

/// Scripted [`ImageGenerator`] for tests. Records every prompt it receives.
#[derive(Clone)]
pub struct MockImageGenerator {
    image_responses: Arc<Mutex<Vec<Vec<u8>>>>,
    failure: Arc<Mutex<Option<MockGenerationFailure>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockImageGenerator {
    pub fn new() -> Self {
        Self {
            image_responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.image_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, failure: MockGenerationFailure) -> Self {
        *self.failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let count = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };

        match *self.failure.lock().unwrap() {
            Some(MockGenerationFailure::Unavailable) => {
                return Err(Error::GenerationUnavailable(
                    "mock upstream returned 500".to_string(),
                ))
            }
            Some(MockGenerationFailure::Unreachable) => {
                return Err(Error::GenerationUnreachable(
                    "mock upstream timed out".to_string(),
                ))
            }
            None => {}
        }

        let responses = self.image_responses.lock().unwrap();
        if responses.is_empty() {
            // Return a tiny valid PNG as default
            Ok(vec![
                0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
                0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
                0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
                0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49,
                0x44, 0x41, // IDAT chunk
                0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2,
                0x25, 0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
                0x44, 0xAE, 0x42, 0x60, 0x82,
            ])
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}
