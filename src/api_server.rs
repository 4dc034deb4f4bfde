// Axum API Server Module
//
// Purpose: JSON API over the pairwise scorer, matcher and plant search index
// CPU-bound scoring runs on the blocking pool; rankings are cached in moka.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::EngineConfig;
use crate::engine::EngineSnapshot;
use crate::error::ScoreError;
use crate::matcher::{MatchOutcome, Matcher};
use crate::scorer::PairScorer;
use crate::search_index::SearchIndex;

/// Largest population accepted by `/api/ranks` (pair count grows quadratically)
pub const MAX_RANK_SAMPLE: usize = 500;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub scorer: PairScorer,
    pub matcher: Matcher,
    pub search_index: Arc<SearchIndex>,
    /// Top-hybrid rankings keyed by sample size
    pub cache: Cache<usize, serde_json::Value>,
}

impl AppState {
    /// Load every table named by `config`
    pub async fn new(config: &EngineConfig) -> anyhow::Result<Self> {
        let config = config.clone();

        tokio::task::spawn_blocking(move || -> anyhow::Result<Self> {
            tracing::info!("Loading engine snapshot...");
            let snapshot = EngineSnapshot::load(&config)?;

            tracing::info!("Building plant search index...");
            let search_index = SearchIndex::load(&config.plants_file, &snapshot.traits);

            Ok(Self::from_parts(snapshot, search_index))
        })
        .await?
    }

    /// Assemble state from an already-built snapshot
    pub fn from_parts(snapshot: Arc<EngineSnapshot>, search_index: SearchIndex) -> Self {
        let scorer = PairScorer::new(snapshot);
        let matcher = Matcher::new(scorer.clone());

        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(Duration::from_secs(300)) // 5 min TTL
            .build();

        Self {
            scorer,
            matcher,
            search_index: Arc::new(search_index),
            cache,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/predict", post(predict_hybrid))
        .route("/api/predict-single", post(predict_single))
        .route("/api/ranks", get(ranks))
        .route("/api/plants/search", get(search_plants))
        // Middleware (applied in reverse order)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub plant_a: String,
    pub plant_b: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictSingleRequest {
    pub plant: String,
    /// Optional zone name filter ("Sahara", "plateau", ...)
    pub zone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RanksParams {
    pub sample_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn predict_hybrid(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let scorer = state.scorer.clone();
    tracing::info!("Scoring pair {} x {}", payload.plant_a, payload.plant_b);

    let result = tokio::task::spawn_blocking(move || scorer.score_pair(&payload.plant_a, &payload.plant_b))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    Ok(Json(serde_json::to_value(result)?))
}

async fn predict_single(
    State(state): State<AppState>,
    Json(payload): Json<PredictSingleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let matcher = state.matcher.clone();
    tracing::info!("Best match for {} (zone {:?})", payload.plant, payload.zone);

    let outcome = tokio::task::spawn_blocking(move || {
        matcher.find_best_match(&payload.plant, payload.zone.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    match outcome {
        MatchOutcome::Found(result) => Ok(Json(serde_json::to_value(*result)?)),
        MatchOutcome::NoMatch => Ok(Json(serde_json::json!({ "message": "No match found." }))),
    }
}

async fn ranks(
    State(state): State<AppState>,
    Query(params): Query<RanksParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let sample_size = params
        .sample_size
        .unwrap_or(state.matcher.config().hybrid_sample)
        .min(MAX_RANK_SAMPLE);

    if let Some(cached) = state.cache.get(&sample_size).await {
        tracing::debug!("Cache hit for ranks (sample_size={})", sample_size);
        return Ok(Json(cached));
    }

    let matcher = state.matcher.clone();
    let results = tokio::task::spawn_blocking(move || matcher.top_hybrids(sample_size))
        .await
        .map_err(|e| AppError::Internal(format!("Rayon task failed: {}", e)))??;

    tracing::info!("Ranked {} hybrids (sample_size={})", results.len(), sample_size);

    let value = serde_json::to_value(results)?;
    state.cache.insert(sample_size, value.clone()).await;

    Ok(Json(value))
}

async fn search_plants(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<serde_json::Value> {
    let query = params.q.unwrap_or_default();
    let data = state.search_index.search(&query);

    Json(serde_json::json!({
        "rows": data.len(),
        "data": data
    }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Internal(String),
    NotFound(String),
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::GenusNotFound(genus) => {
                tracing::debug!("Genus not found: {}", genus);
                AppError::NotFound("Plant not found".to_string())
            }
            ScoreError::Classifier(e) => AppError::Internal(format!("Classifier error: {}", e)),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(msg) => {
                tracing::error!("{}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
