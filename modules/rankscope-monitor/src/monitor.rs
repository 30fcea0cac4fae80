//! Run orchestration: bounded parallel SERP fan-out, optional keyword
//! discovery, knowledge-graph entity check, per-query analysis, summary.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use dataforseo_client::{DataForSeoClient, DataForSeoError, Engine, SerpItem};
use rankscope_analysis::{summarize, Analyzer};
use rankscope_common::{AnalysisRequest, AnalysisRun, Config, QueryAnalysis};

/// Concurrent upstream fetches across the whole run. Six keeps the fan-out
/// inside DataForSEO's rate limits while still overlapping most latency.
const MAX_CONCURRENT_FETCHES: usize = 6;

/// Max attempts per (keyword, engine) fetch for transient failures.
const FETCH_MAX_ATTEMPTS: u32 = 3;
/// Base backoff. Actual delay is base * 3^attempt plus random jitter (0-1s).
const FETCH_RETRY_BASE: Duration = Duration::from_secs(2);

/// Request limit and keep count for Labs keyword discovery.
const DISCOVERY_LIMIT: u32 = 100;
const DISCOVERY_KEEP: usize = 50;

pub struct Monitor {
    client: Arc<DataForSeoClient>,
}

impl Monitor {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Arc::new(DataForSeoClient::new(
                config.dataforseo_login.clone(),
                config.dataforseo_password.clone(),
            )),
        }
    }

    /// Run one full analysis. Per-query fetch failures are isolated: a
    /// query with no data at all is counted as failed and excluded from
    /// scoring, and one bad query never aborts the batch.
    pub async fn run(&self, analysis_id: &str, request: &AnalysisRequest) -> AnalysisRun {
        let started = Instant::now();
        let mode = request.mode;

        info!(
            analysis_id,
            brand = %request.brand_name,
            mode = %mode,
            queries = request.serp_queries.len(),
            "Starting visibility analysis"
        );

        let competitors: Vec<String> = match mode.max_competitors() {
            Some(cap) => request.competitors.iter().take(cap).cloned().collect(),
            None => request.competitors.clone(),
        };
        let analyzer = Analyzer::new(&request.brand_domain, &competitors);

        // Expand the query set with keywords the brand already ranks for.
        // Discovery failures degrade to the user-supplied queries alone.
        let mut keywords: Vec<String> = request.serp_queries.clone();
        if mode.discover_keywords() {
            match self
                .client
                .keywords_for_site(
                    &request.brand_domain,
                    &request.location,
                    &request.language,
                    DISCOVERY_LIMIT,
                    DISCOVERY_KEEP,
                )
                .await
            {
                Ok(discovered) => {
                    keywords = merge_keywords(keywords, discovered);
                }
                Err(DataForSeoError::InsufficientCredits) => {
                    warn!("Insufficient credits for keyword discovery, using provided keywords only");
                }
                Err(err) => {
                    warn!(error = %err, "Keyword discovery failed, using provided keywords only");
                }
            }
        }
        keywords.truncate(mode.max_keywords());

        let brand_knowledge_graph_present = self.check_knowledge_graph(request).await;

        let pages = self.fetch_all(&keywords, request).await;

        let mut results: Vec<QueryAnalysis> = Vec::with_capacity(keywords.len());
        let mut queries_failed = 0usize;
        for keyword in &keywords {
            let google = pages.get(&(keyword.clone(), Engine::Google));
            let bing = pages.get(&(keyword.clone(), Engine::Bing));

            let both_failed = matches!(google, Some(Err(_)) | None)
                && matches!(bing, Some(Err(_)) | None);
            if both_failed {
                // No data for either engine: unscorable, not scored-zero.
                queries_failed += 1;
                warn!(%keyword, "Both fetches failed, query excluded from scoring");
                continue;
            }

            let google_items = ok_items(google);
            let bing_items = ok_items(bing);
            results.push(analyzer.analyze(
                keyword,
                &request.location,
                &request.device,
                google_items,
                bing_items,
            ));
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let summary = summarize(&results, queries_failed, mode, elapsed_ms);

        info!(
            analysis_id,
            scored = results.len(),
            failed = queries_failed,
            avg_score = summary.ai_visibility_scoring.average_score,
            elapsed_ms,
            "Analysis complete"
        );

        AnalysisRun {
            analysis_id: analysis_id.to_string(),
            request: request.clone(),
            brand_knowledge_graph_present,
            results,
            summary,
        }
    }

    /// Fetch every (keyword, engine) page in parallel under one semaphore.
    /// Results are keyed after the fact; no ordering between fetches.
    async fn fetch_all(
        &self,
        keywords: &[String],
        request: &AnalysisRequest,
    ) -> HashMap<(String, Engine), Result<Vec<SerpItem>, DataForSeoError>> {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES));

        let fetches = keywords.iter().flat_map(|keyword| {
            [Engine::Google, Engine::Bing].into_iter().map(|engine| {
                let semaphore = Arc::clone(&semaphore);
                let client = Arc::clone(&self.client);
                let keyword = keyword.clone();
                let location = request.location.clone();
                let device = request.device.clone();
                let language = request.language.clone();
                async move {
                    let outcome = async {
                        let _permit = acquire_fetch_slot(&semaphore).await?;
                        fetch_with_retry(&client, engine, &keyword, &location, &device, &language)
                            .await
                    }
                    .await;
                    ((keyword, engine), outcome)
                }
            })
        });

        futures::future::join_all(fetches).await.into_iter().collect()
    }

    /// One Google SERP for the brand name, scanned for a knowledge-graph
    /// entity. Failure is a zero-information outcome, not a run failure.
    async fn check_knowledge_graph(&self, request: &AnalysisRequest) -> bool {
        match self
            .client
            .fetch_serp(
                Engine::Google,
                &request.brand_name,
                &request.location,
                "desktop",
                &request.language,
            )
            .await
        {
            Ok(items) => {
                let found = items
                    .iter()
                    .any(|item| item.item_type.as_deref() == Some("knowledge_graph"));
                info!(brand = %request.brand_name, found, "Knowledge-graph entity check");
                found
            }
            Err(err) => {
                warn!(brand = %request.brand_name, error = %err, "Knowledge-graph check failed");
                false
            }
        }
    }
}

fn ok_items<'a>(
    outcome: Option<&'a Result<Vec<SerpItem>, DataForSeoError>>,
) -> &'a [SerpItem] {
    match outcome {
        Some(Ok(items)) => items.as_slice(),
        _ => &[],
    }
}

/// Union of user queries and discovered keywords: user order first,
/// discovered terms appended unless already present.
fn merge_keywords(user: Vec<String>, discovered: Vec<String>) -> Vec<String> {
    let mut merged = user;
    for keyword in discovered {
        if !merged.contains(&keyword) {
            merged.push(keyword);
        }
    }
    merged
}

/// A closed semaphore means the runtime is tearing down; surface it as a
/// transient fetch failure instead of panicking mid-run.
async fn acquire_fetch_slot(
    semaphore: &Semaphore,
) -> Result<tokio::sync::SemaphorePermit<'_>, DataForSeoError> {
    semaphore
        .acquire()
        .await
        .map_err(|_| DataForSeoError::Network("fetch semaphore closed".to_string()))
}

async fn fetch_with_retry(
    client: &DataForSeoClient,
    engine: Engine,
    keyword: &str,
    location: &str,
    device: &str,
    language: &str,
) -> Result<Vec<SerpItem>, DataForSeoError> {
    let mut attempt = 0u32;
    loop {
        match client
            .fetch_serp(engine, keyword, location, device, language)
            .await
        {
            Ok(items) => return Ok(items),
            Err(err) if err.is_transient() && attempt + 1 < FETCH_MAX_ATTEMPTS => {
                let backoff = FETCH_RETRY_BASE * 3u32.pow(attempt);
                let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
                warn!(
                    keyword,
                    engine = %engine,
                    attempt = attempt + 1,
                    backoff_secs = backoff.as_secs(),
                    error = %err,
                    "Transient SERP fetch failure, retrying"
                );
                tokio::time::sleep(backoff + jitter).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(keyword, engine = %engine, error = %err, "SERP fetch failed");
                return Err(err);
            }
        }
    }
}
