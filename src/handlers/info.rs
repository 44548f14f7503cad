//! Service information handlers

use crate::context::AppContext;
use crate::error::ApiError;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HomeResponse {
    success: bool,
    message: &'static str,
    status: &'static str,
    model: &'static str,
    classes: Vec<&'static str>,
    version: &'static str,
    endpoints: BTreeMap<&'static str, &'static str>,
}

pub async fn home(State(ctx): State<Arc<AppContext>>) -> Json<HomeResponse> {
    let endpoints = BTreeMap::from([
        ("GET /", "API information"),
        ("GET /health", "Health check"),
        ("GET /test", "Debug information"),
        ("POST /predict", "Classify fruit image"),
    ]);

    Json(HomeResponse {
        success: true,
        message: "Fruit Classification API - Eastern Indonesian Fruits",
        status: "running",
        model: "MobileNetV2 (Transfer Learning)",
        classes: ctx.class_names(),
        version: env!("CARGO_PKG_VERSION"),
        endpoints,
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    success: bool,
    status: &'static str,
    model_loaded: bool,
    model_path: String,
    timestamp: f64,
}

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "healthy",
        model_loaded: ctx.model_loaded(),
        model_path: ctx.model_path().display().to_string(),
        timestamp: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
    })
}

#[derive(Serialize)]
pub struct TestResponse {
    success: bool,
    message: &'static str,
    model_loaded: bool,
    classes: Vec<&'static str>,
}

pub async fn test(State(ctx): State<Arc<AppContext>>) -> Json<TestResponse> {
    Json(TestResponse {
        success: true,
        message: "Test endpoint working!",
        model_loaded: ctx.model_loaded(),
        classes: ctx.class_names(),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
