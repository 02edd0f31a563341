//! HTTP surface: the generation endpoint plus small read-only helpers.

use crate::models::{GeneratedContent, GenerationRequest, StyleCatalog};
use crate::orchestrator::FallbackOrchestrator;
use crate::style::{LANGUAGES, MOODS};
use crate::{prompts, request, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<FallbackOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: FallbackOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/api/styles", get(styles_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `POST /api/generate`.
///
/// The body is parsed here rather than through the `Json` extractor so that a
/// malformed body is reported like any other internal failure.
async fn generate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GeneratedContent>> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generate", %request_id);

    generate(&state, &body).instrument(span).await.map(Json)
}

async fn generate(state: &AppState, body: &[u8]) -> Result<GeneratedContent> {
    let raw: GenerationRequest = serde_json::from_slice(body)?;
    let normalized = request::normalize(raw)?;

    let prompt = prompts::build_prompt_for_style(
        &normalized.focus,
        &normalized.mood_display,
        &normalized.language_display,
        &normalized.style,
    );

    state
        .orchestrator
        .generate(&normalized.image, &prompt)
        .await
}

async fn styles_handler() -> Json<StyleCatalog> {
    Json(StyleCatalog {
        moods: MOODS.keys().map(str::to_string).collect(),
        languages: LANGUAGES.keys().map(str::to_string).collect(),
    })
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
