//! Pure citation-extraction and scoring engine. Everything in this crate
//! is a function of (page features, brand domain, competitor domains);
//! no I/O, no async, no shared state.

pub mod analyzer;
pub mod citations;
pub mod classify;
pub mod scoring;
pub mod summary;

pub use analyzer::Analyzer;
pub use citations::{extract_citations, select_citation_source};
pub use classify::{classify_bing_features, classify_google_features};
pub use scoring::{competitor_score, dominance_rank, visibility_score, ScoreWeights, VisibilitySignals};
pub use summary::summarize;
