use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use rankscope_common::AnalysisRequest;
use rankscope_monitor::export_run;

use crate::jobs::{AnalysisJob, JobStatus};
use crate::AppState;

const SERVICE_NAME: &str = "rankscope-api";

#[derive(Serialize)]
pub struct StatusResponse {
    pub analysis_id: Uuid,
    pub status: JobStatus,
    pub message: String,
    pub started_at: chrono::DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<Utc>>,
}

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "timestamp": Utc::now(),
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now(),
    }))
}

/// Start an analysis in the background and return its job handle.
pub async fn start_analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> impl IntoResponse {
    if let Err(err) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, &err.to_string());
    }

    let analysis_id = Uuid::new_v4();
    let job = AnalysisJob::new(analysis_id, request.clone());
    let started_at = job.started_at;

    state.jobs.write().await.insert(analysis_id, job);

    info!(%analysis_id, brand = %request.brand_name, mode = %request.mode, "Analysis accepted");

    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        run_job(task_state, analysis_id, request).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(StatusResponse {
            analysis_id,
            status: JobStatus::Pending,
            message: "Analysis started".to_string(),
            started_at,
            completed_at: None,
        }),
    )
        .into_response()
}

async fn run_job(state: Arc<AppState>, analysis_id: Uuid, request: AnalysisRequest) {
    if let Some(job) = state.jobs.write().await.get_mut(&analysis_id) {
        job.status = JobStatus::Running;
    }

    let run = state.monitor.run(&analysis_id.to_string(), &request).await;

    // Every attempted query failing means the upstream was unreachable for
    // the whole run; surface that as a failed job rather than an empty one.
    let all_failed = run.summary.total_queries == 0 && run.summary.queries_failed > 0;

    if !all_failed {
        if let Err(err) = export_run(&run, &state.results_dir) {
            error!(%analysis_id, error = %err, "Failed to export analysis run");
        }
    }

    let mut jobs = state.jobs.write().await;
    let Some(job) = jobs.get_mut(&analysis_id) else {
        return;
    };
    job.completed_at = Some(Utc::now());
    if all_failed {
        job.status = JobStatus::Failed;
        job.error = Some(format!(
            "all {} queries failed to fetch",
            run.summary.queries_failed
        ));
    } else {
        job.status = JobStatus::Completed;
        job.brand_knowledge_graph_present = Some(run.brand_knowledge_graph_present);
        job.results = Some(run.results);
        job.summary = Some(run.summary);
    }
}

pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.jobs.read().await.get(&id) {
        Some(job) => Json(job.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Analysis not found"),
    }
}

pub async fn get_analysis_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.jobs.read().await.get(&id) {
        Some(job) => Json(StatusResponse {
            analysis_id: job.analysis_id,
            status: job.status,
            message: format!("Analysis {}", job.status),
            started_at: job.started_at,
            completed_at: job.completed_at,
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Analysis not found"),
    }
}

pub async fn list_analyses(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let jobs = state.jobs.read().await;
    let mut entries: Vec<serde_json::Value> = jobs
        .values()
        .map(|job| {
            serde_json::json!({
                "analysis_id": job.analysis_id,
                "status": job.status,
                "brand_name": job.request.brand_name,
                "mode": job.request.mode,
                "started_at": job.started_at,
                "completed_at": job.completed_at,
            })
        })
        .collect();
    entries.sort_by(|a, b| b["started_at"].as_str().cmp(&a["started_at"].as_str()));

    Json(serde_json::json!({ "analyses": entries }))
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
