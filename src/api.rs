use std::path::Path;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::counts::LabelCounts;
use crate::service::SentimentService;
use crate::store::Record;

const POSTS_DEFAULT_LIMIT: usize = 50;
const POSTS_MAX_LIMIT: usize = 500;
const COUNTS_MAX_MINUTES: u32 = 60;
const ROLLING_MAX_MINUTES: u32 = 120;
const DEFAULT_MINUTES: u32 = 5;

#[derive(Clone)]
pub struct AppState {
    pub service: SentimentService,
    pub hashtag: String,
    /// Window applied to `/api/posts`, in minutes.
    pub window_min: u32,
    /// Name of the active event source, reported by `/api/health`.
    pub source: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/posts", get(posts))
        .route("/api/stats/counts", get(stats_counts))
        .route("/api/stats/rolling", get(stats_rolling))
        .route("/api/_debug/buf-size", get(buf_size))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Serve a built frontend from `dir` for every unmatched path.
/// Unknown paths fall back to `index.html`.
pub fn with_frontend(router: Router, dir: &Path) -> Router {
    if !dir.is_dir() {
        tracing::info!(target: "api", dir = %dir.display(), "no frontend build; serving API only");
        return router;
    }
    let index = ServeFile::new(dir.join("index.html"));
    router.fallback_service(ServeDir::new(dir).not_found_service(index))
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{name} must be between {min} and {max}, got {got}")]
    OutOfRange {
        name: &'static str,
        min: usize,
        max: usize,
        got: usize,
    },
    /// Query string that does not parse (negative or non-numeric values).
    #[error("invalid query: {0}")]
    BadQuery(String),
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        ApiError::BadQuery(r.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

fn check_range(name: &'static str, got: usize, min: usize, max: usize) -> Result<usize, ApiError> {
    if (min..=max).contains(&got) {
        Ok(got)
    } else {
        Err(ApiError::OutOfRange { name, min, max, got })
    }
}

/// Unix seconds → RFC 3339 (UTC). Non-representable values map to the epoch.
pub fn iso_ts(ts: f64) -> String {
    let secs = ts.floor();
    let nanos = ((ts - secs) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    DateTime::<Utc>::from_timestamp(secs as i64, nanos)
        .unwrap_or_default()
        .to_rfc3339()
}

#[derive(Serialize)]
struct HealthOut {
    status: &'static str,
    hashtag: String,
    source: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthOut> {
    Json(HealthOut {
        status: "ok",
        hashtag: state.hashtag.clone(),
        source: state.source,
    })
}

#[derive(Deserialize)]
struct PostsQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PostOut {
    pub id: String,
    pub ts: String,
    pub source: String,
    pub author: Option<String>,
    pub label: Option<String>,
    pub confidence: Option<f64>,
    pub text: String,
}

impl From<&Record> for PostOut {
    fn from(r: &Record) -> Self {
        Self {
            id: r.id.clone(),
            ts: iso_ts(r.timestamp),
            source: r.source.clone(),
            author: r.author.clone(),
            label: Some(r.label.to_string()),
            confidence: Some(r.confidence),
            text: r.text.clone(),
        }
    }
}

async fn posts(
    State(state): State<AppState>,
    q: Result<Query<PostsQuery>, QueryRejection>,
) -> Result<Json<Vec<PostOut>>, ApiError> {
    let Query(q) = q?;
    let limit = check_range(
        "limit",
        q.limit.unwrap_or(POSTS_DEFAULT_LIMIT),
        1,
        POSTS_MAX_LIMIT,
    )?;
    let rows = state
        .service
        .list_recent(limit, f64::from(state.window_min));
    Ok(Json(rows.iter().map(|r| PostOut::from(r.as_ref())).collect()))
}

#[derive(Deserialize)]
struct MinutesQuery {
    minutes: Option<u32>,
}

async fn stats_counts(
    State(state): State<AppState>,
    q: Result<Query<MinutesQuery>, QueryRejection>,
) -> Result<Json<LabelCounts>, ApiError> {
    let Query(q) = q?;
    let minutes = check_range(
        "minutes",
        q.minutes.unwrap_or(DEFAULT_MINUTES) as usize,
        1,
        COUNTS_MAX_MINUTES as usize,
    )?;
    Ok(Json(state.service.label_counts(minutes as f64)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointOut {
    pub ts: String,
    pub value: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RollingOut {
    pub points: Vec<PointOut>,
}

async fn stats_rolling(
    State(state): State<AppState>,
    q: Result<Query<MinutesQuery>, QueryRejection>,
) -> Result<Json<RollingOut>, ApiError> {
    let Query(q) = q?;
    let minutes = check_range(
        "minutes",
        q.minutes.unwrap_or(DEFAULT_MINUTES) as usize,
        1,
        ROLLING_MAX_MINUTES as usize,
    )?;
    let points = state
        .service
        .rolling_mean(minutes as f64)
        .into_iter()
        .map(|p| PointOut {
            ts: iso_ts(p.timestamp),
            value: p.value,
        })
        .collect();
    Ok(Json(RollingOut { points }))
}

#[derive(Serialize)]
struct BufSizeOut {
    buffer: usize,
}

async fn buf_size(State(state): State<AppState>) -> Json<BufSizeOut> {
    Json(BufSizeOut {
        buffer: state.service.buffer_size(),
    })
}
