mod geocode;
mod search;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use placegrid_core::AppConfig;
use placegrid_engine::{SearchEngine, SearchError};

use crate::middleware::{request_id, RequestId};

/// Per-request defaults for search parameters the query string leaves out.
#[derive(Debug, Clone)]
pub struct SearchDefaults {
    pub area_size_m: f64,
    pub grid_size: u32,
    pub overlap: f64,
    pub max_results_per_tile: u32,
    pub region_code: String,
}

impl SearchDefaults {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            area_size_m: config.default_area_size_m,
            grid_size: config.default_grid_size,
            overlap: config.default_overlap,
            max_results_per_tile: config.max_results_per_tile,
            region_code: config.region_code.clone(),
        }
    }
}

/// Shared handler state. The engine is absent when the provider
/// credential is not configured; data endpoints then fail closed while
/// `/health` keeps answering.
#[derive(Clone)]
pub struct AppState {
    pub engine: Option<Arc<SearchEngine>>,
    pub defaults: SearchDefaults,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    api_key_configured: bool,
    provider: &'static str,
}

impl ResponseMeta {
    pub(crate) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            // "misconfigured" and "internal_error" both land here.
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    match error {
        SearchError::InvalidInput(msg) => ApiError::new(request_id, "bad_request", msg.clone()),
        SearchError::NotFound(msg) => ApiError::new(request_id, "not_found", msg.clone()),
    }
}

/// Returns the engine or the `misconfigured` error the data endpoints
/// share when the provider credential is absent.
pub(super) fn require_engine<'a>(
    state: &'a AppState,
    request_id: &str,
) -> Result<&'a Arc<SearchEngine>, ApiError> {
    state.engine.as_ref().ok_or_else(|| {
        ApiError::new(
            request_id.to_owned(),
            "misconfigured",
            "provider API key is not configured",
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search::search))
        .route("/geocode", get(geocode::geocode))
        .route("/health", get(health))
        .layer(axum::middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors())
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match &state.engine {
        Some(engine) => {
            if engine.probe().await {
                (
                    StatusCode::OK,
                    Json(ApiResponse {
                        data: HealthData {
                            status: "ok",
                            api_key_configured: true,
                            provider: "ok",
                        },
                        meta,
                    }),
                )
            } else {
                tracing::warn!("health check: provider probe failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ApiResponse {
                        data: HealthData {
                            status: "degraded",
                            api_key_configured: true,
                            provider: "unreachable",
                        },
                        meta,
                    }),
                )
            }
        }
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                data: HealthData {
                    status: "degraded",
                    api_key_configured: false,
                    provider: "unconfigured",
                },
                meta,
            }),
        ),
    }
}
