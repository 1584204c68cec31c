//! On-disk storage for visit photos
//!
//! Uploads are downscaled to at most [`MAX_WIDTH`] pixels wide and re-encoded
//! as JPEG before they hit the disk, so the album stays light on mobile data.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

use crate::domain::DomainError;

pub const MAX_WIDTH: u32 = 800;
pub const JPEG_QUALITY: u8 = 40;

/// Upper bound on accepted upload size
pub const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode, shrink and persist an uploaded image.
    /// Returns the stored file name, relative to the store root.
    pub async fn save(&self, data: Vec<u8>) -> Result<String, DomainError> {
        if data.is_empty() {
            return Err(DomainError::Validation("Uploaded photo is empty".into()));
        }
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(DomainError::Validation(format!(
                "Photo exceeds {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        // Decoding and resizing are CPU bound
        let jpeg = tokio::task::spawn_blocking(move || shrink_to_jpeg(&data))
            .await
            .map_err(|e| DomainError::Internal(format!("Photo task failed: {}", e)))??;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| DomainError::Internal(format!("Failed to create photo dir: {}", e)))?;

        let file_name = format!("{}.jpg", uuid::Uuid::new_v4());
        tokio::fs::write(self.root.join(&file_name), jpeg)
            .await
            .map_err(|e| DomainError::Internal(format!("Failed to save photo: {}", e)))?;

        tracing::debug!("Stored photo {}", file_name);
        Ok(file_name)
    }

    /// Remove a stored photo; a missing file is not an error
    pub async fn remove(&self, file_name: &str) {
        // Only bare file names produced by `save` are accepted
        if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
            tracing::warn!("Refusing to remove suspicious photo path: {}", file_name);
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.root.join(file_name)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove photo {}: {}", file_name, e);
            }
        }
    }
}

fn shrink_to_jpeg(data: &[u8]) -> Result<Vec<u8>, DomainError> {
    let img = image::load_from_memory(data)
        .map_err(|e| DomainError::Validation(format!("Unsupported image: {}", e)))?;

    let img = if img.width() > MAX_WIDTH {
        let height = (img.height() as u64 * MAX_WIDTH as u64 / img.width() as u64).max(1) as u32;
        img.resize_exact(MAX_WIDTH, height, FilterType::Triangle)
    } else {
        img
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| DomainError::Internal(format!("Failed to encode photo: {}", e)))?;
    Ok(out)
}
