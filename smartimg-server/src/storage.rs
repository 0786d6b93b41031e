//! Flat on-disk store for transformed images.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use smartimg::PixelGrid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to encode output: {0}")]
    Encode(#[from] smartimg::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A persisted output file, addressable through `/download/{file_name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    pub path: PathBuf,
}

impl StoredImage {
    pub fn download_url(&self) -> String {
        format!("/download/{}", self.file_name)
    }
}

#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    /// Create the directory if missing. Called once at startup.
    pub fn prepare(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();

        if root.is_dir() {
            tracing::info!(path = %root.display(), "Uploads directory already exists");
        } else {
            fs::create_dir_all(&root)?;
            tracing::info!(path = %root.display(), "Created missing uploads directory");
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Encode `img` as JPEG and write it as `{uuid}_{suffix}.jpg`.
    pub fn persist(
        &self,
        img: &PixelGrid,
        suffix: &str,
        quality: u8,
    ) -> Result<StoredImage, StorageError> {
        let bytes = smartimg::encode_jpeg(img, quality)?;

        let file_name = format!("{}_{suffix}.jpg", uuid::Uuid::new_v4());
        let path = self.root.join(&file_name);

        fs::write(&path, &bytes).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(file = %file_name, bytes = bytes.len(), "Persisted output image");
        Ok(StoredImage { file_name, path })
    }
}
