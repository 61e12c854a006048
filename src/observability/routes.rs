use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use http::{header::CONTENT_TYPE, StatusCode};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::error;

use crate::config::settings::MetricsConfig;
use crate::scheduler::SchedulerState;
use crate::server::server::AppState;

pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
pub struct MetricsState {
    pub registry: Registry,
}

impl MetricsState {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn router(&self, metrics_config: &MetricsConfig) -> Router<AppState> {
        Router::new()
            .route(metrics_config.path.as_str(), get(get_metrics))
            .route(HEALTH_PATH, get(get_health))
    }
}

/// Prometheus text exposition of everything in `registry`.
pub fn encode_metrics(registry: &Registry) -> prometheus::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

async fn get_metrics(State(state): State<AppState>) -> Response {
    match encode_metrics(&state.metrics_state.registry) {
        Ok(body) => (StatusCode::OK, [(CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        Err(e) => {
            error!("cannot encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_health(State(state): State<AppState>) -> Response {
    let current = *state.scheduler_state.borrow();
    let status = match current {
        SchedulerState::Running => StatusCode::OK,
        SchedulerState::Setup | SchedulerState::Done => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, current.as_str()).into_response()
}
