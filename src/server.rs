//! HTTP service for uploads and analysis.
//!
//! Exposes the analysis pipeline and the injected blob store over HTTP,
//! together with Prometheus metrics. Decoding and extraction run on the
//! blocking thread pool so large images never stall the async workers.

use crate::analysis::{format_summary, DetectionMonitor, StegoReport};
use crate::analyzer::{Analyzer, PipelineError};
use crate::config::ServerConfig;
use crate::error::AnalysisError;
use crate::extraction::{extract_plane, Channel, PLANE_COUNT};
use crate::ingest::{validate_key, BlobStore, StoreError};
use crate::metrics::{MetricsError, MetricsRegistry, MetricsSnapshot};
use crate::processor::{ProcessorClient, ProcessorError, ToolResults};
use crate::render::{encode_png, render_bit_plane, render_channel, RenderError};
use crate::report::AnalysisResult;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

/// Errors that can occur while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("processor client error: {0}")]
    Processor(#[from] ProcessorError),

    #[error("server error: {0}")]
    Server(String),
}

/// Errors returned to HTTP clients as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Processor(#[from] ProcessorError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Processor URL is not configured.")]
    ProcessorNotConfigured,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Analysis(e) => ApiError::Analysis(e),
            PipelineError::Store(e) => ApiError::Store(e),
            PipelineError::Serialize(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Analysis(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Internal(_) | ApiError::ProcessorNotConfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Processor(_) => StatusCode::BAD_GATEWAY,
            ApiError::Render(RenderError::InvalidSize { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Shared state for request handlers.
pub struct AppState {
    analyzer: Analyzer,
    store: Arc<dyn BlobStore>,
    processor: Option<ProcessorClient>,
    monitor: Mutex<DetectionMonitor>,
    metrics: MetricsRegistry,
}

impl AppState {
    /// Creates handler state around an analyzer and a blob store.
    pub fn new(
        analyzer: Analyzer,
        store: Arc<dyn BlobStore>,
        processor: Option<ProcessorClient>,
    ) -> Result<Self, MetricsError> {
        let monitor = DetectionMonitor::new(analyzer.thresholds().clone());
        Ok(Self {
            analyzer,
            store,
            processor,
            monitor: Mutex::new(monitor),
            metrics: MetricsRegistry::new()?,
        })
    }

    async fn record(&self, outcome: Option<StegoReport>) {
        let mut monitor = self.monitor.lock().await;
        match outcome {
            Some(report) => {
                monitor.record(report);
            }
            None => monitor.record_failure(),
        }
        self.metrics
            .update(&MetricsSnapshot::from_detection(monitor.metrics()));
    }

    /// Runs a store operation on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn BlobStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(outcome?)
    }

    /// Runs a full analysis on the blocking pool and records the verdict.
    async fn analyze<F>(&self, job: F) -> Result<(AnalysisResult, StegoReport), ApiError>
    where
        F: FnOnce(&Analyzer, &dyn BlobStore) -> Result<AnalysisResult, ApiError> + Send + 'static,
    {
        let analyzer = self.analyzer.clone();
        let store = Arc::clone(&self.store);

        let outcome = tokio::task::spawn_blocking(move || {
            let result = job(&analyzer, store.as_ref())?;
            let report = analyzer.detect(&result)?;
            Ok::<_, ApiError>((result, report))
        })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

        match outcome {
            Ok((result, report)) => {
                self.record(Some(report.clone())).await;
                Ok((result, report))
            }
            Err(e) => {
                if matches!(e, ApiError::Analysis(_)) {
                    self.record(None).await;
                }
                Err(e)
            }
        }
    }
}

/// HTTP server for uploads, analysis and metrics.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new server.
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Returns the shared handler state.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Builds the router with all routes and layers.
    pub fn router(&self) -> Router {
        router(Arc::clone(&self.state), self.config.max_upload_bytes)
    }

    /// Starts the HTTP server and runs until it is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr: SocketAddr = ([0, 0, 0, 0], self.config.port).into();
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!(addr = %addr, "Analysis server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/upload", post(upload))
        .route("/api/file/:key", get(download).delete(delete_file))
        .route("/api/stegsolve", post(stegsolve))
        .route("/api/stegsolve/:key", post(stegsolve_stored))
        .route("/api/run-command", post(run_command))
        .route("/api/report/:key", get(stego_report))
        .route("/api/summary/:key", get(summary))
        .route("/api/render/:key", get(render))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Query parameters for uploads.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Storage key; generated from the current time when absent.
    pub key: Option<String>,
    /// Passphrase forwarded to the processor.
    pub password: Option<String>,
}

/// Response body for uploads.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub key: String,
    pub size: usize,
    /// LSB verdict, present when the upload decodes as an image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lsb: Option<StegoReport>,
    /// Processor tool output, present when a processor is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_data: Option<ToolResults>,
}

/// Handler for POST /api/upload.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No valid file uploaded.".to_string()));
    }

    let key = params
        .key
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| format!("upload-{}", chrono::Utc::now().timestamp_millis()));
    validate_key(&key)?;

    let stored = body.clone();
    let put_key = key.clone();
    state
        .with_store(move |store| store.put(&put_key, &stored))
        .await?;
    tracing::info!(key = %key, bytes = body.len(), "Stored upload");

    let job_body = body.clone();
    let job_key = key.clone();
    let lsb = match state
        .analyze(move |analyzer, _| Ok(analyzer.analyze_bytes(&job_key, &job_body)?))
        .await
    {
        Ok((_, report)) => Some(report),
        // Non-image uploads are still forwarded to the processor
        Err(ApiError::Analysis(e)) => {
            tracing::debug!(key = %key, error = %e, "Upload is not an analyzable image");
            None
        }
        Err(e) => return Err(e),
    };

    let processor_data = match &state.processor {
        Some(client) => Some(client.process(&key, params.password.as_deref()).await?),
        None => None,
    };

    Ok(Json(UploadResponse {
        key,
        size: body.len(),
        lsb,
        processor_data,
    }))
}

/// Handler for GET /api/file/:key.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let fetch_key = key.clone();
    let bytes = state
        .with_store(move |store| store.fetch(&fetch_key))
        .await?;
    let content_type = image::ImageFormat::from_path(&key)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{key}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Plain confirmation body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Handler for DELETE /api/file/:key.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let delete_key = key.clone();
    state
        .with_store(move |store| store.delete(&delete_key))
        .await?;
    tracing::info!(key = %key, "Deleted upload");
    Ok(Json(MessageResponse {
        message: "File deleted successfully.".to_string(),
    }))
}

/// Query parameters for body analysis.
#[derive(Debug, Deserialize)]
pub struct StegsolveParams {
    /// Name recorded in the result; `upload` when absent.
    pub filename: Option<String>,
}

/// Handler for POST /api/stegsolve: analyzes the request body.
pub async fn stegsolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StegsolveParams>,
    body: Bytes,
) -> Result<Json<AnalysisResult>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No image file provided".to_string()));
    }
    let filename = params.filename.unwrap_or_else(|| "upload".to_string());

    let (result, _) = state
        .analyze(move |analyzer, _| Ok(analyzer.analyze_bytes(&filename, &body)?))
        .await?;
    Ok(Json(result))
}

/// Handler for POST /api/stegsolve/:key: analyzes a stored upload.
pub async fn stegsolve_stored(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let (result, _) = state
        .analyze(move |analyzer, store| Ok(analyzer.analyze_key(store, &key)?))
        .await?;
    Ok(Json(result))
}

/// Body of a processor run over a stored upload.
#[derive(Debug, Deserialize)]
pub struct RunCommandRequest {
    /// Storage key of the upload.
    pub key: Option<String>,
    /// Passphrase forwarded to the processor.
    pub password: Option<String>,
}

/// Handler for POST /api/run-command: re-runs the processor over a stored upload.
pub async fn run_command(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunCommandRequest>,
) -> Result<Json<ToolResults>, ApiError> {
    let key = request
        .key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing file key.".to_string()))?;
    validate_key(&key)?;

    let client = state
        .processor
        .as_ref()
        .ok_or(ApiError::ProcessorNotConfigured)?;
    let results = client.process(&key, request.password.as_deref()).await?;

    tracing::info!(key = %key, tools = results.len(), "Processor run finished");
    Ok(Json(results))
}

/// Handler for GET /api/report/:key.
pub async fn stego_report(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<StegoReport>, ApiError> {
    let (_, report) = state
        .analyze(move |analyzer, store| Ok(analyzer.analyze_key(store, &key)?))
        .await?;
    Ok(Json(report))
}

/// Handler for GET /api/summary/:key.
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let (result, report) = state
        .analyze(move |analyzer, store| Ok(analyzer.analyze_key(store, &key)?))
        .await?;
    let text = format_summary(&result.dimensions, &report);

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response())
}

/// Query parameters for rendering.
#[derive(Debug, Deserialize)]
pub struct RenderParams {
    /// Channel to render.
    pub channel: Channel,
    /// Bit plane to render instead of the raw channel.
    pub plane: Option<u8>,
}

/// Handler for GET /api/render/:key: renders a channel or bit plane as PNG.
pub async fn render(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(params): Query<RenderParams>,
) -> Result<Response, ApiError> {
    if let Some(plane) = params.plane {
        if plane >= PLANE_COUNT {
            return Err(ApiError::BadRequest(format!(
                "plane must be 0-{}, got {plane}",
                PLANE_COUNT - 1
            )));
        }
    }

    let store = Arc::clone(&state.store);
    let analyzer = state.analyzer.clone();
    let png = tokio::task::spawn_blocking(move || {
        let result = analyzer.analyze_key(store.as_ref(), &key)?;
        let channel = result.rgb_channels.get(params.channel);
        let image = match params.plane {
            Some(plane) => render_bit_plane(&extract_plane(channel, plane))?,
            None => render_channel(channel, params.channel)?,
        };
        Ok::<_, ApiError>(encode_png(&image)?)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Handler for the /metrics endpoint.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

/// Handler for the /health endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
