//! Image upload and classification

use crate::context::AppContext;
use crate::error::ApiError;
use crate::models::classify_types::PredictionResult;
use crate::services::prediction_service::{self, UploadError};
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use std::time::Instant;

const IMAGE_FIELD: &str = "image";

struct Upload {
    file_name: String,
    bytes: Bytes,
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e.body_text())))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upload bytes: {}", e);
            ApiError::BadRequest(format!("Failed to read upload: {}", e.body_text()))
        })?;
        return Ok(Some(Upload { file_name, bytes }));
    }
    Ok(None)
}

pub async fn predict(
    State(ctx): State<Arc<AppContext>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let started = Instant::now();

    let mut multipart = multipart.map_err(|_| UploadError::Missing)?;
    let upload = read_image_field(&mut multipart)
        .await?
        .ok_or(UploadError::Missing)?;

    prediction_service::validate_upload(&upload.file_name, upload.bytes.len())?;

    let worker_ctx = ctx.clone();
    let bytes = upload.bytes;
    let scored = tokio::task::spawn_blocking(move || {
        prediction_service::classify_upload(&worker_ctx, &bytes)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Inference task failed: {}", e)))??;

    let profile = ctx
        .catalog()
        .get(scored.predicted)
        .cloned()
        .ok_or_else(|| ApiError::Internal(format!("No fruit profile for {}", scored.predicted)))?;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let result = prediction_service::build_result(scored, profile, elapsed_ms);

    tracing::info!(
        class = %result.predicted_class,
        confidence = result.confidence,
        elapsed_ms = result.inference_time_ms,
        "Prediction"
    );

    Ok(Json(result))
}
