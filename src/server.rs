//! HTTP surface: `GET /health` and `POST /extract-pdf`.
//!
//! Every accepted upload is answered with HTTP 200 and a
//! [`ResponseEnvelope`], whatever the pipeline outcome. Only rejected
//! uploads (wrong extension, missing or unreadable multipart body) get a
//! 4xx status, with a `{"detail": …}` body.

use crate::config::ServiceConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::ExtractError;
use crate::extract::Extractor;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Multipart field that carries the PDF.
pub const UPLOAD_FIELD: &str = "file";

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    extractor: Arc<Extractor>,
}

impl AppState {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

/// A rejected request: status code plus a `detail` message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        let status = if e.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            detail: e.to_string(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self {
            status: e.status(),
            detail: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Build the application router.
///
/// Fails if `frontend_url` cannot be used as an `Access-Control-Allow-Origin`
/// value.
pub fn router(state: AppState) -> Result<Router, ExtractError> {
    let config = state.extractor.config();
    let cors = cors_layer(&config.frontend_url)?;
    let body_limit = config.max_upload_bytes;

    Ok(Router::new()
        .route("/health", get(health))
        .route("/extract-pdf", post(extract_pdf))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// One allowed origin with credentials. Wildcard methods/headers are not
/// permitted alongside credentials, so both are mirrored from the request.
fn cors_layer(frontend_url: &str) -> Result<CorsLayer, ExtractError> {
    let origin = HeaderValue::from_str(frontend_url).map_err(|e| {
        ExtractError::InvalidConfig(format!("invalid frontend URL '{frontend_url}': {e}"))
    })?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: ServiceConfig) -> Result<(), ExtractError> {
    let config = Arc::new(config);
    let extractor = Extractor::from_config(Arc::clone(&config))?;
    let app = router(AppState::new(extractor))?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ExtractError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(address = %addr, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ExtractError::Internal(format!("server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "PDF OCR and LLM Extraction API",
        "endpoints": {
            "POST /extract-pdf": "Extract and process PDF with OCR + LLM"
        }
    }))
}

/// POST /extract-pdf
async fn extract_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let (filename, bytes) = read_upload(&mut multipart).await?;
    let envelope = state.extractor.extract_upload(&filename, &bytes).await?;
    Ok(Json(envelope))
}

/// Pull the upload out of the multipart body. Other fields are ignored.
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        // Reject before buffering the body of a non-PDF upload.
        crate::pipeline::ingest::validate_filename(&filename)?;
        let bytes = field.bytes().await?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(ExtractError::MissingUpload.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        let e: ApiError = ExtractError::NotAPdf {
            filename: "a.txt".into(),
        }
        .into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.detail, "Only PDF files are supported");

        let e: ApiError = ExtractError::MissingUpload.into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_origin_is_a_config_error() {
        let err = cors_layer("http://bad\norigin").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }
}
