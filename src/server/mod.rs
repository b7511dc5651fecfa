//! HTTP request layer: the JSON API the browser client calls, plus static
//! serving of the store directory (version images and export artifacts).
//!
//! Handlers are thin: they decode the wire shapes, then hand off to the
//! version store or export pipeline on a blocking worker. Store mutations
//! go through one coarse mutex so concurrent saves cannot interleave their
//! read-modify-write-flush cycles.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::error::{AmError, Result};
use crate::export::{ExportFormat, ExportPipeline};
use crate::revision::current_revision;
use crate::store::{Version, VersionStore};

/// Shared state behind every API handler.
pub struct AppState {
    store: Mutex<VersionStore>,
    pipeline: ExportPipeline,
    /// Directory of the sketch working tree, probed for git revisions.
    project_dir: PathBuf,
    /// URL prefix under which store files are served.
    public_url: String,
}

impl AppState {
    pub fn new(
        store: VersionStore,
        pipeline: ExportPipeline,
        project_dir: PathBuf,
        public_url: String,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            pipeline,
            project_dir,
            public_url,
        }
    }
}

// === Wire shapes ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Base64 data URL of the canvas capture.
    pub image: String,
    pub config: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub id: String,
    /// Substituted into children of the deleted version.
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    /// Base64 data URLs, playback order.
    pub frames: Vec<String>,
    pub id: String,
    pub format: String,
    #[serde(default)]
    pub fps: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'static str>,
}

/// AmError wrapper carrying HTTP status mapping.
pub struct ApiError(AmError);

impl From<AmError> for ApiError {
    fn from(e: AmError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_caller_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        if status.is_server_error() {
            error!(kind = self.0.kind(), "Request failed: {}", self.0);
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
            suggestion: self.0.suggestion(),
        };
        (status, Json(body)).into_response()
    }
}

// === Handlers ===

async fn save(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveRequest>,
) -> std::result::Result<Json<Vec<Version>>, ApiError> {
    let image = decode_data_url(&req.image)?;
    let list = run_blocking(move |state| {
        let revision = current_revision(&state.project_dir);
        let mut store = state.store.lock().expect("version store lock poisoned");
        store.create(req.parent_id, &image, req.config, revision)
    }, &state)
    .await?;
    Ok(Json(list))
}

async fn delete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRequest>,
) -> std::result::Result<Json<Vec<Version>>, ApiError> {
    let list = run_blocking(move |state| {
        let mut store = state.store.lock().expect("version store lock poisoned");
        store.delete(&req.id, req.parent_id)
    }, &state)
    .await?;
    Ok(Json(list))
}

async fn render(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenderRequest>,
) -> std::result::Result<Json<RenderResponse>, ApiError> {
    let format = ExportFormat::parse(&req.format)?;
    let frames = req
        .frames
        .iter()
        .map(|f| decode_data_url(f))
        .collect::<Result<Vec<_>>>()?;

    let artifact = run_blocking(
        move |state| state.pipeline.export(&frames, format, &req.id, req.fps),
        &state,
    )
    .await?;

    Ok(Json(RenderResponse {
        url: format!("{}{artifact}", state.public_url),
    }))
}

async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Version>> {
    let store = state.store.lock().expect("version store lock poisoned");
    Json(store.list())
}

/// Runs store/encoder work on the blocking pool.
async fn run_blocking<T, F>(f: F, state: &Arc<AppState>) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| AmError::Other(format!("blocking task failed: {e}")))?
}

/// Extracts and decodes the base64 payload of a data URL.
///
/// Accepts bare base64 as well, since test clients tend to skip the
/// `data:image/png;base64,` prefix.
pub fn decode_data_url(value: &str) -> Result<Vec<u8>> {
    let payload = match value.split_once(',') {
        Some((_, rest)) => rest,
        None => value,
    };
    if payload.is_empty() {
        return Err(AmError::Decode("empty image payload".to_string()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AmError::Decode(format!("invalid base64 image payload: {e}")))
}

/// Builds the API router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let store_dir = state.store.lock().expect("version store lock poisoned").store_dir().to_path_buf();
    Router::new()
        .route("/api/save", post(save))
        .route("/api/delete", post(delete))
        .route("/api/render", post(render))
        .route("/api/list", get(list))
        .fallback_service(ServeDir::new(store_dir))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Binds and serves the API until the process exits.
pub async fn run(state: Arc<AppState>, bind: &str, port: u16) -> Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AmError::WebServerFailed {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

    info!(url = %state.public_url, "Listening");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| AmError::WebServerFailed {
            addr,
            reason: e.to_string(),
        })
}
