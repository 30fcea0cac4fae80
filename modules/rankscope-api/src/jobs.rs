//! In-memory analysis job store. Jobs move pending → running →
//! completed | failed and are kept for the lifetime of the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rankscope_common::{AnalysisRequest, QueryAnalysis, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisJob {
    pub analysis_id: Uuid,
    pub status: JobStatus,
    pub request: AnalysisRequest,
    pub brand_knowledge_graph_present: Option<bool>,
    pub results: Option<Vec<QueryAnalysis>>,
    pub summary: Option<RunSummary>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AnalysisJob {
    pub fn new(analysis_id: Uuid, request: AnalysisRequest) -> Self {
        Self {
            analysis_id,
            status: JobStatus::Pending,
            request,
            brand_knowledge_graph_present: None,
            results: None,
            summary: None,
            error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(JobStatus::Running.to_string(), "running");
    }
}
