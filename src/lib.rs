pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod services;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use config::Config;
use context::AppContext;
use error::{AppError, ErrorBody};
use handlers::info::method_not_allowed;
use services::catalog_service::FruitCatalog;
use services::classifier::model_manager::{LabelManifest, ModelManager};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the router. `max_body_bytes` must exceed the upload limit so
/// oversized images are reported by the handler rather than the body limit.
pub fn create_router(ctx: Arc<AppContext>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::info::home).fallback(method_not_allowed))
        .route("/health", get(handlers::info::health).fallback(method_not_allowed))
        .route("/test", get(handlers::info::test).fallback(method_not_allowed))
        .route("/predict", post(handlers::predict::predict).fallback(method_not_allowed))
        .fallback(handlers::info::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
        .with_state(ctx)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal server error")),
    )
        .into_response()
}

/// Loads the model, label manifest and fruit catalog. Any failure here is fatal.
pub async fn build_context(config: &Config) -> Result<AppContext, AppError> {
    if !config.model_path.is_file() {
        return Err(format!("Model not found at {}", config.model_path.display()).into());
    }

    let labels = LabelManifest::load(&config.labels_path)?;
    let catalog = FruitCatalog::load(config.fruit_profiles_path.as_deref())?;
    context::check_catalog(&labels, &catalog)?;

    let model_path = config.model_path.clone();
    let intra_threads = config.intra_threads;
    let model = tokio::task::spawn_blocking(move || ModelManager::load(&model_path, intra_threads))
        .await
        .map_err(|e| AppError {
            message: format!("Failed to spawn model loading task: {}", e),
        })??;

    tracing::info!("Model loaded from: {}", model.model_path().display());
    tracing::info!(
        "Classes: {}",
        labels
            .labels()
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    );

    AppContext::new(Arc::new(model), labels, catalog, config.model_path.clone())
}

/// Starts the prediction service and serves until the process is stopped.
pub async fn run(config: Config) -> Result<(), AppError> {
    let ctx = build_context(&config).await?;
    let app = create_router(Arc::new(ctx), config.max_body_bytes);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| AppError {
        message: format!("Failed to bind {}: {}", addr, e),
    })?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("  GET  /         : API info");
    tracing::info!("  GET  /health   : Health check");
    tracing::info!("  GET  /test     : Debug info");
    tracing::info!("  POST /predict  : Predict fruit");

    axum::serve(listener, app).await?;
    Ok(())
}
