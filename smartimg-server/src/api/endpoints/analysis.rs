//! `POST /analyze`: quality metrics without modifying the image.

use axum::extract::Multipart;
use axum::Json;
use serde::Serialize;
use smartimg::QualityMetrics;

use crate::api::error::ApiError;
use crate::api::upload::{read_upload, run_blocking};
use crate::api::timestamp;

const OPERATION: &str = "analysis";

#[derive(Debug, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub size_kb: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub filename: String,
    pub timestamp: String,
    pub image_info: ImageInfo,
    pub analysis: QualityMetrics,
    pub recommendations: Vec<String>,
}

pub async fn analyze(multipart: Multipart) -> Result<Json<AnalyzeResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    let size_kb = upload.size_kb();
    let bytes = upload.bytes;

    let analysis = run_blocking(OPERATION, move || {
        let img = smartimg::decode(&bytes).map_err(|e| ApiError::from_image(OPERATION, e))?;
        Ok(smartimg::analysis::analyze(&img))
    })
    .await?;

    tracing::info!(
        filename = %upload.filename,
        rating = %analysis.metrics.quality_rating,
        "Analyzed image"
    );

    Ok(Json(AnalyzeResponse {
        filename: upload.filename,
        timestamp: timestamp(),
        image_info: ImageInfo {
            width: analysis.width,
            height: analysis.height,
            size_kb,
        },
        analysis: analysis.metrics,
        recommendations: analysis.recommendations,
    }))
}
