use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RankScopeError;

// --- Domain value type ---

/// A canonical hostname: lowercase, no scheme, no `www.` prefix, no path.
/// Two domains refer to the same entity iff their canonical strings are
/// byte-equal, so every comparison in the system goes through [`Domain::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Canonicalize a bare hostname or a full URL into a `Domain`.
    ///
    /// Strips the scheme, a leading `www.` (case-insensitive), and any
    /// path/query/fragment, then lowercases. Unusable input yields an empty
    /// domain, which callers must skip rather than treat as a real citation.
    /// Idempotent: normalizing an already-canonical domain is a no-op.
    pub fn normalize(raw: &str) -> Domain {
        let trimmed = raw.trim();

        // Scheme'd input goes through the URL parser, which also drops
        // ports and userinfo. Bare hostnames are not valid absolute URLs,
        // so those take the string path below.
        if trimmed.contains("://") {
            let host = Url::parse(trimmed)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_string()))
                .unwrap_or_default();
            return Domain(strip_www(&host.to_lowercase()).to_string());
        }

        let host = trimmed
            .split(['/', '?', '#'])
            .next()
            .unwrap_or("")
            .to_lowercase();
        Domain(strip_www(&host).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

// --- Page features ---

/// A raw citation entry as reported by the SERP provider. The effective
/// domain is the explicit `domain` field when present, else the host
/// parsed from `url`; an entry with neither contributes nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub domain: Option<String>,
    pub url: Option<String>,
}

/// One typed feature of a search-results page, as classified from the
/// provider's heterogeneous item list.
#[derive(Debug, Clone, PartialEq)]
pub enum PageFeature {
    /// AI-generated answer panel with its winning citation source list.
    AiAnswer { citations: Vec<Citation> },
    FeaturedSnippet,
    KnowledgeGraph,
    PeopleAlsoAsk { questions: Vec<String> },
    /// Bing-style AI presence marker: no citation list, only the provider's
    /// type label and at most one attributable domain.
    AiMarker {
        label: String,
        domain: Option<Domain>,
    },
    /// Anything the scorer ignores.
    Other,
}

// --- Analysis request / mode ---

/// Analysis depth. Collapses what used to be separate fast/comprehensive
/// service variants into one configuration-driven mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    Fast,
    Comprehensive,
}

impl AnalysisMode {
    pub fn max_keywords(&self) -> usize {
        match self {
            AnalysisMode::Fast => 5,
            AnalysisMode::Comprehensive => 20,
        }
    }

    /// `None` means no cap.
    pub fn max_competitors(&self) -> Option<usize> {
        match self {
            AnalysisMode::Fast => Some(3),
            AnalysisMode::Comprehensive => None,
        }
    }

    /// Comprehensive runs expand the query set with keywords the brand
    /// domain already ranks for; fast runs skip the extra Labs call.
    pub fn discover_keywords(&self) -> bool {
        matches!(self, AnalysisMode::Comprehensive)
    }
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisMode::Fast => write!(f, "fast"),
            AnalysisMode::Comprehensive => write!(f, "comprehensive"),
        }
    }
}

/// Input parameters for one monitoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub brand_name: String,
    pub brand_domain: String,
    #[serde(default)]
    pub competitors: Vec<String>,
    pub serp_queries: Vec<String>,
    #[serde(default = "default_industry")]
    pub industry: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub mode: AnalysisMode,
}

impl AnalysisRequest {
    /// Reject requests that cannot produce any analysis at all. Defaults
    /// cover everything else.
    pub fn validate(&self) -> Result<(), RankScopeError> {
        if self.brand_domain.trim().is_empty() {
            return Err(RankScopeError::Validation(
                "brand_domain is required".to_string(),
            ));
        }
        if self.serp_queries.iter().all(|q| q.trim().is_empty()) {
            return Err(RankScopeError::Validation(
                "at least one serp query is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_industry() -> String {
    "General".to_string()
}

fn default_location() -> String {
    "United States".to_string()
}

fn default_device() -> String {
    "desktop".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

// --- Per-query analysis output ---

/// The complete analysis of one query, immutable once produced.
/// Field names are part of the persisted output contract; downstream
/// consumers diff exported runs, so they must stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub query: String,
    pub location: String,
    pub device: String,
    pub timestamp: DateTime<Utc>,

    // Google AI overview
    pub google_ai_overview_present: bool,
    pub google_ai_citations: Vec<Domain>,
    pub google_brand_cited: bool,
    /// Competitors with at least one citation; zero-citation competitors
    /// are absent, not present-with-zero.
    pub google_competitor_citations: BTreeMap<String, u32>,

    // Other Google SERP features
    pub featured_snippet_present: bool,
    pub knowledge_graph_present: bool,
    pub people_also_ask_present: bool,
    pub people_also_ask_queries: Vec<String>,

    // Bing AI features
    pub bing_ai_features: Vec<String>,
    pub bing_brand_visibility: bool,
    pub bing_people_also_ask_present: bool,
    pub bing_people_also_ask_queries: Vec<String>,

    // Scoring
    pub ai_visibility_score: f64,
    pub competitor_ai_scores: BTreeMap<String, f64>,
    pub ai_dominance_rank: u32,
}

// --- Run summary ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceStat {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreStat {
    pub average_score: f64,
    pub max_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorCitations {
    pub domain: String,
    pub citations: u64,
}

/// Batch summary folded from a run's per-query results. Percentages and
/// averages are computed over scored queries only; queries whose fetches
/// failed are counted in `queries_failed` and excluded everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_queries: usize,
    pub queries_failed: usize,
    pub processing_time_ms: u64,
    pub performance_mode: AnalysisMode,
    pub ai_overview_presence: PresenceStat,
    /// Denominator is the number of AI-present queries (guarded against zero).
    pub brand_citations: PresenceStat,
    pub ai_visibility_scoring: ScoreStat,
    /// Aggregated competitor citation totals, descending.
    pub competitor_performance: Vec<CompetitorCitations>,
    pub recommendations: Vec<String>,
}

/// A completed run as persisted to disk: input parameters, one record per
/// query, and the folded summary, as a single flat JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub analysis_id: String,
    pub request: AnalysisRequest,
    /// Whether a knowledge-graph entity exists for the brand name itself.
    pub brand_knowledge_graph_present: bool,
    pub results: Vec<QueryAnalysis>,
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_scheme_www_and_path() {
        assert_eq!(
            Domain::normalize("https://www.Example.com/path?q=1#frag").as_str(),
            "example.com"
        );
        assert_eq!(Domain::normalize("WWW.Example.com").as_str(), "example.com");
        assert_eq!(Domain::normalize("example.com/page"), Domain::normalize("example.com"));
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [
            "https://www.mayoclinic.org/diseases",
            "WebMD.com",
            "www.nike.com",
            "",
            "not a url at all",
        ] {
            let once = Domain::normalize(raw);
            let twice = Domain::normalize(once.as_str());
            assert_eq!(once, twice, "normalize not idempotent for {raw:?}");
        }
    }

    #[test]
    fn normalize_unusable_input_is_empty() {
        assert!(Domain::normalize("").is_empty());
        assert!(Domain::normalize("https://").is_empty());
        assert!(Domain::normalize("/just/a/path").is_empty());
    }

    #[test]
    fn normalize_drops_port_on_full_urls() {
        assert_eq!(
            Domain::normalize("https://example.com:8443/x").as_str(),
            "example.com"
        );
    }

    #[test]
    fn mode_limits() {
        assert_eq!(AnalysisMode::Fast.max_keywords(), 5);
        assert_eq!(AnalysisMode::Fast.max_competitors(), Some(3));
        assert!(!AnalysisMode::Fast.discover_keywords());
        assert_eq!(AnalysisMode::Comprehensive.max_keywords(), 20);
        assert_eq!(AnalysisMode::Comprehensive.max_competitors(), None);
    }

    #[test]
    fn request_defaults_fill_in() {
        let req: AnalysisRequest = serde_json::from_str(
            r#"{"brand_name": "Nike", "brand_domain": "nike.com", "serp_queries": ["running shoes"]}"#,
        )
        .unwrap();
        assert_eq!(req.location, "United States");
        assert_eq!(req.device, "desktop");
        assert_eq!(req.mode, AnalysisMode::Fast);
        assert!(req.competitors.is_empty());
    }

    fn minimal_request() -> AnalysisRequest {
        serde_json::from_str(
            r#"{"brand_name": "Nike", "brand_domain": "nike.com", "serp_queries": ["running shoes"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn validate_accepts_minimal_request() {
        assert!(minimal_request().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_brand_domain() {
        let mut req = minimal_request();
        req.brand_domain = "  ".to_string();
        assert!(matches!(
            req.validate(),
            Err(RankScopeError::Validation(msg)) if msg.contains("brand_domain")
        ));
    }

    #[test]
    fn validate_rejects_all_blank_queries() {
        let mut req = minimal_request();
        req.serp_queries = vec!["".to_string(), "   ".to_string()];
        assert!(matches!(
            req.validate(),
            Err(RankScopeError::Validation(msg)) if msg.contains("serp query")
        ));
    }
}
