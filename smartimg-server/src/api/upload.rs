//! Multipart upload extraction and blocking-pool dispatch shared by every image endpoint.

use axum::body::Bytes;
use axum::extract::Multipart;

use super::error::ApiError;

const FILE_FIELD: &str = "file";

/// The `file` part of a multipart upload
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

/// Pull the `file` field out of the form, ignoring any other fields.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;

        tracing::info!(filename = %filename, "Received file");
        tracing::debug!("File size: {:.2} KB", bytes.len() as f64 / 1024.0);

        return Ok(Upload { filename, bytes });
    }

    Err(ApiError::BadRequest("No file provided".into()))
}

/// Run CPU-bound image work off the async executor.
pub async fn run_blocking<T, F>(operation: &'static str, work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal(operation, e))?
}
