//! Storage for uploaded images.

use async_trait::async_trait;
use axum::body::Bytes;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::config::MediaConfig;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("No image provided")]
    Missing,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File exceeds the {0} byte upload limit")]
    TooLarge(usize),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists uploaded files and returns their path relative to the media root.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn store(
        &self,
        folder: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, MediaError>;
}

/// Writes files under `<root_dir>/<folder>/<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalMediaStorage {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root_dir),
            max_bytes: config.max_upload_bytes,
        }
    }
}

/// File extension for an image content type.
fn image_extension(content_type: &str) -> Result<&'static str, MediaError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !essence.starts_with("image/") {
        return Err(MediaError::UnsupportedType(content_type.to_string()));
    }

    let ext = match essence.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        other => mime_guess::get_mime_extensions_str(other).and_then(|exts| exts.first().copied()),
    };
    ext.ok_or_else(|| MediaError::UnsupportedType(content_type.to_string()))
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(
        &self,
        folder: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Missing);
        }
        if bytes.len() > self.max_bytes {
            return Err(MediaError::TooLarge(self.max_bytes));
        }
        let ext = image_extension(content_type)?;

        let relative = format!("{}/{}.{}", folder, Uuid::new_v4(), ext);
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &bytes).await?;

        tracing::debug!(path = %relative, size = bytes.len(), "Stored upload");
        Ok(relative)
    }
}
