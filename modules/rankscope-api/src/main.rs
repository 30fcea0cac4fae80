use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use rankscope_common::Config;
use rankscope_monitor::Monitor;

mod jobs;
mod rest;

use jobs::AnalysisJob;

pub struct AppState {
    pub monitor: Monitor,
    pub results_dir: String,
    pub jobs: RwLock<HashMap<Uuid, AnalysisJob>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rankscope=info".parse()?))
        .init();

    let config = Config::from_env();
    let addr = format!("{}:{}", config.api_host, config.api_port);

    let state = Arc::new(AppState {
        monitor: Monitor::new(&config),
        results_dir: config.results_dir.clone(),
        jobs: RwLock::new(HashMap::new()),
    });

    let app = Router::new()
        .route("/", get(rest::root))
        .route("/health", get(rest::health))
        .route("/api/v1/analyze", post(rest::start_analysis))
        .route("/api/v1/analysis/{id}", get(rest::get_analysis))
        .route("/api/v1/analysis/{id}/status", get(rest::get_analysis_status))
        .route("/api/v1/analyses", get(rest::list_analyses))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "rankscope API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
