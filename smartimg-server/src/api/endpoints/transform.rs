//! Transformation endpoints. Each decodes the upload, applies one transform,
//! persists the result as JPEG and returns where to download it.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use smartimg::{FilterKind, FlipDirection, Transform};

use crate::api::error::ApiError;
use crate::api::upload::{read_upload, run_blocking, Upload};
use crate::api::{timestamp, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Size { width, height }
    }
}

#[derive(Debug, Serialize)]
pub struct ResizeResponse {
    pub filename: String,
    pub timestamp: String,
    pub original_size: Size,
    pub new_size: Size,
    pub transformation: &'static str,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct CropRegion {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Serialize)]
pub struct CropResponse {
    pub filename: String,
    pub timestamp: String,
    pub original_size: Size,
    pub crop_region: CropRegion,
    pub cropped_size: Size,
    pub transformation: &'static str,
    pub download_url: String,
}

/// Response for enhance, filter, rotate and flip
#[derive(Debug, Serialize)]
pub struct TransformResponse {
    pub filename: String,
    pub timestamp: String,
    pub original_size: Size,
    pub new_size: Size,
    pub transformation: &'static str,
    pub parameters: Transform,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ResizeQuery {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub percentage: Option<f64>,
}

impl ResizeQuery {
    /// Either `percentage` alone or both `width` and `height`.
    fn into_transform(self) -> Result<Transform, ApiError> {
        match (self.width, self.height, self.percentage) {
            (None, None, Some(percentage)) => Ok(Transform::ResizeByPercentage { percentage }),
            (Some(width), Some(height), None) => Ok(Transform::Resize { width, height }),
            (_, _, Some(_)) => Err(ApiError::BadRequest(
                "Provide either percentage OR (width, height), not both".into(),
            )),
            _ => Err(ApiError::BadRequest(
                "Provide either percentage OR both width and height".into(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CropQuery {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct RotateQuery {
    pub angle: f64,
}

#[derive(Debug, Deserialize)]
pub struct FlipQuery {
    pub direction: String,
}

struct Transformed {
    original: Size,
    output: Size,
    download_url: String,
}

/// Decode, transform and persist on the blocking pool.
async fn transform_upload(
    state: &AppState,
    upload: &Upload,
    transform: Transform,
) -> Result<Transformed, ApiError> {
    let operation = transform.name();
    let uploads = state.uploads.clone();
    let quality = state.config.jpeg_quality;
    let bytes = upload.bytes.clone();

    let transformed = run_blocking(operation, move || {
        let img = smartimg::decode(&bytes).map_err(|e| ApiError::from_image(operation, e))?;
        let output = transform.apply(&img).map_err(|e| ApiError::from_image(operation, e))?;
        let stored = uploads
            .persist(&output, transform.output_suffix(), quality)
            .map_err(|e| ApiError::internal(operation, e))?;

        Ok(Transformed {
            original: img.dimensions().into(),
            output: output.dimensions().into(),
            download_url: stored.download_url(),
        })
    })
    .await?;

    tracing::info!(
        filename = %upload.filename,
        operation,
        url = %transformed.download_url,
        "Transformed image"
    );

    Ok(transformed)
}

/// `POST /resize?width=&height=` or `POST /resize?percentage=`
pub async fn resize(
    State(state): State<AppState>,
    query: Result<Query<ResizeQuery>, QueryRejection>,
    multipart: Multipart,
) -> Result<Json<ResizeResponse>, ApiError> {
    let Query(query) = query?;
    let transform = query.into_transform()?;
    let upload = read_upload(multipart).await?;

    let transformed = transform_upload(&state, &upload, transform).await?;

    Ok(Json(ResizeResponse {
        filename: upload.filename,
        timestamp: timestamp(),
        original_size: transformed.original,
        new_size: transformed.output,
        transformation: "resize",
        download_url: transformed.download_url,
    }))
}

/// `POST /crop?x=&y=&width=&height=`
pub async fn crop(
    State(state): State<AppState>,
    query: Result<Query<CropQuery>, QueryRejection>,
    multipart: Multipart,
) -> Result<Json<CropResponse>, ApiError> {
    let Query(CropQuery { x, y, width, height }) = query?;
    let upload = read_upload(multipart).await?;

    let transform = Transform::Crop {
        x,
        y,
        width,
        height,
    };
    let transformed = transform_upload(&state, &upload, transform).await?;

    Ok(Json(CropResponse {
        filename: upload.filename,
        timestamp: timestamp(),
        original_size: transformed.original,
        crop_region: CropRegion { x, y, width, height },
        cropped_size: transformed.output,
        transformation: "crop",
        download_url: transformed.download_url,
    }))
}

/// `POST /enhance`
pub async fn enhance(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TransformResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    respond(&state, upload, Transform::Enhance).await
}

/// `POST /filter?kind=`
pub async fn filter(
    State(state): State<AppState>,
    query: Result<Query<FilterQuery>, QueryRejection>,
    multipart: Multipart,
) -> Result<Json<TransformResponse>, ApiError> {
    let Query(query) = query?;
    let kind = FilterKind::parse(&query.kind).map_err(|e| ApiError::from_image("filter", e))?;
    let upload = read_upload(multipart).await?;
    respond(&state, upload, Transform::Filter { kind }).await
}

/// `POST /rotate?angle=`
pub async fn rotate(
    State(state): State<AppState>,
    query: Result<Query<RotateQuery>, QueryRejection>,
    multipart: Multipart,
) -> Result<Json<TransformResponse>, ApiError> {
    let Query(RotateQuery { angle }) = query?;
    let upload = read_upload(multipart).await?;
    respond(&state, upload, Transform::Rotate { angle }).await
}

/// `POST /flip?direction=`
pub async fn flip(
    State(state): State<AppState>,
    query: Result<Query<FlipQuery>, QueryRejection>,
    multipart: Multipart,
) -> Result<Json<TransformResponse>, ApiError> {
    let Query(query) = query?;
    let direction =
        FlipDirection::parse(&query.direction).map_err(|e| ApiError::from_image("flip", e))?;
    let upload = read_upload(multipart).await?;
    respond(&state, upload, Transform::Flip { direction }).await
}

async fn respond(
    state: &AppState,
    upload: Upload,
    transform: Transform,
) -> Result<Json<TransformResponse>, ApiError> {
    let transformed = transform_upload(state, &upload, transform.clone()).await?;

    Ok(Json(TransformResponse {
        filename: upload.filename,
        timestamp: timestamp(),
        original_size: transformed.original,
        new_size: transformed.output,
        transformation: transform.name(),
        parameters: transform,
        download_url: transformed.download_url,
    }))
}
