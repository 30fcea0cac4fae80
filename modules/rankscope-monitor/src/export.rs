//! JSON export of a completed run. One flat document per run with stable
//! field names so downstream consumers can diff exports across runs.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use rankscope_common::{AnalysisRun, RankScopeError};

/// Write a completed run to `<results_dir>/analysis_<id>_<timestamp>.json`.
pub fn export_run(run: &AnalysisRun, results_dir: &str) -> Result<PathBuf, RankScopeError> {
    fs::create_dir_all(results_dir).map_err(|e| {
        RankScopeError::Export(format!("creating results directory {results_dir}: {e}"))
    })?;

    let filename = format!(
        "analysis_{}_{}.json",
        run.analysis_id,
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    let path = PathBuf::from(results_dir).join(filename);

    let body = serde_json::to_string_pretty(run)
        .map_err(|e| RankScopeError::Export(format!("serializing analysis run: {e}")))?;
    fs::write(&path, body)
        .map_err(|e| RankScopeError::Export(format!("writing {}: {e}", path.display())))?;

    info!(path = %path.display(), "Results exported");
    Ok(path)
}
