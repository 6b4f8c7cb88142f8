use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::api::{AnalysisResponse, EmotionRecognizer};
use crate::config::ServerConfig;
use crate::transcription::Transcriber;

use super::upload::{allowed_file, not_allowed_message, save_upload, secure_filename};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    recognizer: Arc<EmotionRecognizer>,
    transcriber: Arc<dyn Transcriber>,
    upload_dir: Arc<PathBuf>,
    allowed_extensions: Arc<Vec<String>>,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        recognizer: Arc<EmotionRecognizer>,
        transcriber: Arc<dyn Transcriber>,
        server: &ServerConfig,
    ) -> Self {
        Self {
            recognizer,
            transcriber,
            upload_dir: Arc::new(server.upload_dir.clone()),
            allowed_extensions: Arc::new(server.allowed_extensions.clone()),
            max_upload_bytes: server.max_upload_bytes,
        }
    }
}

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    NoFileUploaded,
    NoFileSelected,
    FileTypeNotAllowed(String),
    Multipart(MultipartError),
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NoFileUploaded => (StatusCode::BAD_REQUEST, "No file uploaded".to_string()),
            Self::NoFileSelected => (StatusCode::BAD_REQUEST, "No file selected".to_string()),
            Self::FileTypeNotAllowed(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Multipart(err) => (err.status(), err.body_text()),
            Self::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing audio: {}", msg),
            ),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<MultipartError> for HttpServerError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub n_features: usize,
    pub classes: Vec<String>,
    pub transcription: &'static str,
}

/// Build the Axum router with all handlers.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server loop until Ctrl-C.
pub async fn run_http_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding HTTP listener on {}", addr))?;
    tracing::info!(%addr, "emotion analysis server listening");

    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP router")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let artifacts = state.recognizer.artifacts();
    Json(HealthResponse {
        status: "ok",
        n_features: artifacts.n_features(),
        classes: artifacts.labels().classes().to_vec(),
        transcription: state.transcriber.name(),
    })
}

/// Accept an uploaded recording and return its emotion and transcription.
#[tracing::instrument(skip_all)]
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, HttpServerError> {
    let mut multipart = multipart.map_err(|_| HttpServerError::NoFileUploaded)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        // A part without a filename parameter is a form value, not a file
        if field.name() == Some("file") {
            if let Some(filename) = field.file_name().map(str::to_string) {
                let data = field.bytes().await?;
                upload = Some((filename, data));
                break;
            }
        }
    }

    let (original_name, data) = upload.ok_or(HttpServerError::NoFileUploaded)?;
    if original_name.is_empty() {
        return Err(HttpServerError::NoFileSelected);
    }
    if !allowed_file(&original_name, &state.allowed_extensions) {
        return Err(HttpServerError::FileTypeNotAllowed(not_allowed_message(
            &state.allowed_extensions,
        )));
    }

    let filename = secure_filename(&original_name);
    if filename.is_empty() {
        return Err(HttpServerError::Internal(format!(
            "invalid filename '{}'",
            original_name
        )));
    }

    let bytes = data.len();
    let path = save_upload(&state.upload_dir, &filename, data)
        .await
        .map_err(|e| HttpServerError::Internal(e.to_string()))?;
    tracing::info!(file = %filename, stored = %path.display(), bytes, "upload saved");

    let recognizer = Arc::clone(&state.recognizer);
    let audio_path = path.to_path_buf();
    let emotion = tokio::task::spawn_blocking(move || recognizer.recognize(&audio_path))
        .await
        .map_err(|e| HttpServerError::Internal(e.to_string()))?;

    let transcription = state.transcriber.transcribe(&path).await;

    if let Err(err) = path.close() {
        tracing::warn!(%err, file = %filename, "failed to remove stored upload");
    }

    Ok(Json(AnalysisResponse {
        filename,
        emotion,
        transcription,
    }))
}
