//! HTTP surface for the emotion analysis service.
//!
//! Serves the upload page, a health probe and the `/analyze` endpoint that
//! runs emotion recognition and transcription on an uploaded recording.

mod routes;
mod upload;

pub use routes::{build_router, run_http_server, AppState, HealthResponse, HttpServerError};
pub use upload::{allowed_file, secure_filename};
