//! Web UI adapter: one HTML page plus a small JSON API over the shared pipeline.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ModelDescriptor, PipelineConfig, SummaryResult};
use crate::error::SummarizeError;
use crate::infra::config::{SliderConfig, SummaryDefaults};
use crate::llm::Summarizer;
use crate::prompts;

const PAGE_TEMPLATE: &str = include_str!("index.html");

pub struct AppState {
    pub summarizer: Summarizer,
    pub defaults: SummaryDefaults,
    pub sliders: SliderConfig,
    /// Adapter-level bound on one request; the pipeline itself has none.
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    pub model: Option<String>,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub sampling: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub input_word_count: usize,
    pub output_word_count: usize,
    pub compression_ratio: Option<f64>,
    pub compression_percent: Option<f64>,
    pub stats: String,
}

impl From<SummaryResult> for SummarizeResponse {
    fn from(result: SummaryResult) -> Self {
        Self {
            stats: prompts::format_stats(&result),
            compression_percent: result.compression_percent(),
            compression_ratio: result.compression_ratio,
            input_word_count: result.input_word_count,
            output_word_count: result.output_word_count,
            summary: result.summary_text,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Pipeline(SummarizeError),
    /// The body was not a usable request (bad JSON, missing `text`, wrong content type).
    Body(JsonRejection),
    Timeout(Duration),
}

impl From<SummarizeError> for ApiError {
    fn from(err: SummarizeError) -> Self {
        Self::Pipeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            Self::Pipeline(err) => {
                let status = match err {
                    SummarizeError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    SummarizeError::UnknownModel(_) => StatusCode::BAD_REQUEST,
                    SummarizeError::ModelLoad { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    SummarizeError::Generation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.kind(), err.to_string())
            }
            Self::Body(rejection) => (rejection.status(), "validation_error", rejection.body_text()),
            Self::Timeout(limit) => (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                format!("Summarization did not finish within {}s", limit.as_secs()),
            ),
        };

        (status, Json(json!({ "error": message, "kind": kind }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/models", get(list_models))
        .route("/api/summarize", post(summarize))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "web UI listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(&state))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn list_models(State(state): State<Arc<AppState>>) -> Json<Vec<ModelDescriptor>> {
    Json(state.summarizer.cache().registry().models().to_vec())
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let Json(request) = body.map_err(|rejection| {
        tracing::warn!(request_id = %request_id, error = %rejection, "rejected summarize body");
        ApiError::Body(rejection)
    })?;
    let defaults = &state.defaults;

    let config = PipelineConfig::new(
        request.text,
        request.model.unwrap_or_else(|| defaults.model.clone()),
    )
    .with_lengths(
        request.min_length.unwrap_or(defaults.min_length),
        request.max_length.unwrap_or(defaults.max_length),
    )
    .with_sampling(request.sampling.unwrap_or(defaults.sampling));

    tracing::info!(request_id = %request_id, model = %config.model_identifier, "summarize request received");

    let run = state.summarizer.summarize(&config);
    let outcome = match state.request_timeout {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .map_err(|_| ApiError::Timeout(limit))?,
        None => run.await,
    };

    match outcome {
        Ok(result) => Ok(Json(result.into())),
        Err(e) => {
            tracing::warn!(request_id = %request_id, kind = e.kind(), error = %e, "summarize request failed");
            Err(e.into())
        }
    }
}

fn render_page(state: &AppState) -> String {
    let models = state.summarizer.cache().registry().models();

    let options: String = models
        .iter()
        .map(|m| {
            let selected = if m.identifier == state.defaults.model.trim().to_lowercase() {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{id}"{selected}>{id}</option>"#,
                id = escape_html(&m.identifier)
            )
        })
        .collect();

    let details: String = models
        .iter()
        .map(|m| {
            format!(
                "<li><strong>{}</strong> (<code>{}</code>) {}</li>",
                escape_html(&m.identifier),
                escape_html(&m.canonical_name),
                escape_html(&m.description)
            )
        })
        .collect();

    let sliders = &state.sliders;
    PAGE_TEMPLATE
        .replace("{{MODEL_OPTIONS}}", &options)
        .replace("{{MODEL_DETAILS}}", &details)
        .replace("{{MAX_LOW}}", &sliders.max_range.0.to_string())
        .replace("{{MAX_HIGH}}", &sliders.max_range.1.to_string())
        .replace("{{MAX_STEP}}", &sliders.max_step.to_string())
        .replace("{{MAX_DEFAULT}}", &sliders.max_default.to_string())
        .replace("{{MIN_LOW}}", &sliders.min_range.0.to_string())
        .replace("{{MIN_HIGH}}", &sliders.min_range.1.to_string())
        .replace("{{MIN_STEP}}", &sliders.min_step.to_string())
        .replace("{{MIN_DEFAULT}}", &sliders.min_default.to_string())
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
