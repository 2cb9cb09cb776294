use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// File received in a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Writes uploaded files into the public upload directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it is missing
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Store the file and return the generated file name
    pub async fn save(&self, prefix: &str, file: &UploadedFile) -> Result<String> {
        if file.bytes.is_empty() {
            return Err(AppError::Upload(format!("{} is empty", file.original_name)));
        }

        let name = stored_file_name(prefix, &file.original_name);
        tokio::fs::write(self.dir.join(&name), &file.bytes).await?;

        tracing::info!(file = %name, size = file.bytes.len(), "upload stored");
        Ok(name)
    }

    /// Remove a stored file whose record was never written
    pub async fn discard(&self, name: &str) {
        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            tracing::warn!(file = %name, error = %e, "failed to discard upload");
        }
    }
}

/// `<prefix>-<unix millis>-<random>` plus the original extension
pub fn stored_file_name(prefix: &str, original_name: &str) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    let millis = Utc::now().timestamp_millis();

    match extension(original_name) {
        Some(ext) => format!("{prefix}-{millis}-{suffix}.{ext}"),
        None => format!("{prefix}-{millis}-{suffix}"),
    }
}

/// Lowercased extension of the client file name, if it is plain ASCII alphanumerics
fn extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
