use crate::context::AppContext;
use crate::error::{ApiError, AppError};
use crate::models::classify_types::{round2, ConfidenceLevel, PredictionResult};
use crate::models::fruit_types::FruitProfile;
use crate::services::classifier::inference::{self, Scored, INPUT_SIZE};
use crate::services::fs_service::UPLOAD_EXTENSIONS;

/// Largest accepted upload, 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Client-side problems with an uploaded image.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UploadError {
    #[error("No image provided. Please upload an image.")]
    Missing,

    #[error("No file selected")]
    EmptyFilename,

    #[error("Invalid file type. Allowed: jpg, jpeg, png")]
    InvalidType,

    #[error("File too large. Max size: 5MB, your file: {size_mb:.2}MB")]
    TooLarge { size_mb: f64 },

    #[error("Error preprocessing image: {0}")]
    Preprocess(String),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("{0}")]
    Inference(AppError),
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Upload(e) => e.into(),
            PredictError::Inference(e) => ApiError::Internal(e.message),
        }
    }
}

/// Lowercased text after the last `.`, empty when there is none.
fn upload_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Name and size checks, applied before any decoding.
pub fn validate_upload(file_name: &str, size: usize) -> Result<(), UploadError> {
    if file_name.is_empty() {
        return Err(UploadError::EmptyFilename);
    }

    if !UPLOAD_EXTENSIONS.contains(&upload_extension(file_name).as_str()) {
        return Err(UploadError::InvalidType);
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size_mb: size as f64 / BYTES_PER_MB,
        });
    }

    Ok(())
}

/// Preprocess and run the model. Blocking; call from a blocking thread.
pub fn classify_upload(ctx: &AppContext, bytes: &[u8]) -> Result<Scored, PredictError> {
    let input = inference::preprocess_bytes(bytes, INPUT_SIZE)
        .map_err(|e| UploadError::Preprocess(e.message))?;

    let scores = ctx
        .classifier()
        .classify(input)
        .map_err(PredictError::Inference)?;

    let probabilities = inference::to_probabilities(&scores);
    inference::score(&probabilities, ctx.labels()).map_err(PredictError::Inference)
}

pub fn build_result(scored: Scored, profile: FruitProfile, elapsed_ms: f64) -> PredictionResult {
    let warning = ConfidenceLevel::from_confidence(scored.confidence)
        .warning()
        .map(str::to_string);

    PredictionResult {
        success: true,
        predicted_class: scored.predicted,
        confidence: scored.confidence,
        all_probabilities: scored.all_probabilities,
        fruit_info: profile,
        inference_time_ms: round2(elapsed_ms),
        warning,
    }
}
