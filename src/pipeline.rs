//! Per-upload orchestration: validate, store, classify, generate, respond.
//!
//! Every step runs once, in order. A failure part-way through leaves any
//! files already written in place.

use crate::ai::{Classifier, ImageGenerator};
use crate::captions::{choose_caption, CaptionPicker};
use crate::models::{Classification, ProcessCloudResponse, SessionId, MAX_UPLOAD_BYTES};
use crate::storage::ImageStore;
use crate::{prompts, Error, Result};
use tracing::{error, info};

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Injectable service bundle used to construct [`CloudPipeline`].
pub struct PipelineServices {
    pub classifier: Box<dyn Classifier>,
    pub generator: Box<dyn ImageGenerator>,
    pub captions: Box<dyn CaptionPicker>,
}

pub struct CloudPipeline {
    classifier: Box<dyn Classifier>,
    generator: Box<dyn ImageGenerator>,
    captions: Box<dyn CaptionPicker>,
    store: ImageStore,
}

/// Reject anything whose declared type is not `image/...`.
pub fn validate_content_type(content_type: Option<&str>) -> Result<&str> {
    match content_type {
        Some(ct) if ct.starts_with("image/") => Ok(ct),
        _ => Err(Error::InvalidUpload("File must be an image".to_string())),
    }
}

pub fn validate_size(size: usize) -> Result<()> {
    if size > MAX_UPLOAD_BYTES {
        return Err(Error::PayloadTooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

impl CloudPipeline {
    pub fn new(services: PipelineServices, store: ImageStore) -> Self {
        Self {
            classifier: services.classifier,
            generator: services.generator,
            captions: services.captions,
            store,
        }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub async fn process(&self, upload: Upload) -> Result<ProcessCloudResponse> {
        let mime_type = validate_content_type(upload.content_type.as_deref())?;
        validate_size(upload.bytes.len())?;

        let session_id = SessionId::new();
        info!(
            "[{}] Processing upload ({} bytes, {})",
            session_id,
            upload.bytes.len(),
            mime_type
        );

        self.store.save_original(session_id, &upload.bytes).await?;

        let classification = self.classify(session_id, &upload.bytes, mime_type).await?;

        let prompt = prompts::generation_prompt(&classification.label);
        let generated = self.generator.generate(&prompt).await.map_err(|e| {
            error!("[{}] Image generation failed: {}", session_id, e);
            e
        })?;
        info!(
            "[{}] Generated image ({} bytes)",
            session_id,
            generated.len()
        );

        let filename = self
            .store
            .save_generated(session_id, &classification.token, &generated)
            .await?;

        let caption = choose_caption(self.captions.as_ref());
        let response = ProcessCloudResponse::new(session_id, &classification, &filename, caption);
        info!("[{}] Response data: {:?}", session_id, response);

        Ok(response)
    }

    async fn classify(
        &self,
        session_id: SessionId,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<Classification> {
        let raw = self
            .classifier
            .classify(bytes, mime_type)
            .await
            .map_err(|e| {
                error!("[{}] Cloud analysis failed: {}", session_id, e);
                match e {
                    Error::Classification(_) => e,
                    other => Error::Classification(other.to_string()),
                }
            })?;

        let classification = Classification::from_raw(&raw).ok_or_else(|| {
            error!("[{}] Classifier returned an empty label", session_id);
            Error::Classification("Empty label from classifier".to_string())
        })?;
        info!("[{}] Identified object: {}", session_id, classification.label);

        Ok(classification)
    }
}
