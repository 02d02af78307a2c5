//! Filesystem storage for uploaded originals and generated cloud art
//!
//! Two flat directories keyed by session id. Files are never cleaned up.

use crate::models::SessionId;
use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::info;

const ORIGINAL_SUFFIX: &str = "_original.jpg";

#[derive(Debug, Clone)]
pub struct ImageStore {
    uploads_dir: PathBuf,
    generated_dir: PathBuf,
}

impl ImageStore {
    /// Open the store, creating both directories if needed.
    pub fn new(uploads_dir: impl Into<PathBuf>, generated_dir: impl Into<PathBuf>) -> Result<Self> {
        let uploads_dir = uploads_dir.into();
        let generated_dir = generated_dir.into();

        std::fs::create_dir_all(&uploads_dir)?;
        std::fs::create_dir_all(&generated_dir)?;
        info!(
            "Image directories ready: uploads={}, generated={}",
            uploads_dir.display(),
            generated_dir.display()
        );

        Ok(Self {
            uploads_dir,
            generated_dir,
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn generated_dir(&self) -> &Path {
        &self.generated_dir
    }

    pub fn original_filename(session_id: SessionId) -> String {
        format!("{}{}", session_id, ORIGINAL_SUFFIX)
    }

    pub fn generated_filename(session_id: SessionId, token: &str) -> String {
        format!("{}_{}.png", session_id, token)
    }

    pub async fn save_original(&self, session_id: SessionId, bytes: &[u8]) -> Result<PathBuf> {
        let path = self
            .uploads_dir
            .join(Self::original_filename(session_id));
        tokio::fs::write(&path, bytes).await?;
        info!("Saved original image: {}", path.display());
        Ok(path)
    }

    /// Store generated art and return its filename (not the full path).
    pub async fn save_generated(
        &self,
        session_id: SessionId,
        token: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let filename = Self::generated_filename(session_id, token);
        let path = contained_path(&self.generated_dir, &filename).ok_or_else(|| {
            Error::Generic(format!("Refusing to write generated image as '{}'", filename))
        })?;
        tokio::fs::write(&path, bytes).await?;
        info!("Saved generated image: {}", path.display());
        Ok(filename)
    }

    pub async fn read_original(&self, session_id: &str) -> Result<Vec<u8>> {
        let session_id: SessionId = session_id
            .parse()
            .map_err(|_| Error::NotFound("Original image not found".to_string()))?;
        let path = self
            .uploads_dir
            .join(Self::original_filename(session_id));
        read_contained(&self.uploads_dir, &path, "Original image not found").await
    }

    pub async fn read_generated(&self, filename: &str) -> Result<Vec<u8>> {
        let path = contained_path(&self.generated_dir, filename)
            .ok_or_else(|| Error::NotFound("Generated image not found".to_string()))?;
        read_contained(&self.generated_dir, &path, "Generated image not found").await
    }
}

/// Join `filename` onto `dir` only if it is a single plain path component.
fn contained_path(dir: &Path, filename: &str) -> Option<PathBuf> {
    if filename.is_empty() || filename.contains('\0') || filename.contains('\\') {
        return None;
    }
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == filename => Some(dir.join(name)),
        _ => None,
    }
}

async fn read_contained(dir: &Path, path: &Path, missing: &str) -> Result<Vec<u8>> {
    let not_found = || Error::NotFound(missing.to_string());

    // Canonicalize both sides so a symlink cannot point outside the directory.
    let resolved = match tokio::fs::canonicalize(path).await {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    let root = tokio::fs::canonicalize(dir).await?;
    if !resolved.starts_with(&root) {
        tracing::warn!(
            "Blocked read outside storage directory: {}",
            resolved.display()
        );
        return Err(not_found());
    }

    match tokio::fs::read(&resolved).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(e.into()),
    }
}
