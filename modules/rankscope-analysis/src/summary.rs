//! Batch summary: a fold over per-query analyses. The only interesting
//! invariant is the denominators — brand-citation rate is relative to
//! AI-present queries, and failed queries never enter any average.

use std::collections::BTreeMap;

use rankscope_common::{
    AnalysisMode, CompetitorCitations, PresenceStat, QueryAnalysis, RunSummary, ScoreStat,
};

/// Fold a run's scored analyses into a summary. `queries_failed` counts
/// queries that produced no analysis at all (both fetches failed); they are
/// reported, not averaged in as zeros.
pub fn summarize(
    results: &[QueryAnalysis],
    queries_failed: usize,
    mode: AnalysisMode,
    processing_time_ms: u64,
) -> RunSummary {
    let total = results.len();

    let ai_count = results.iter().filter(|r| r.google_ai_overview_present).count();
    let cited_count = results.iter().filter(|r| r.google_brand_cited).count();

    let ai_presence = PresenceStat {
        count: ai_count,
        percentage: percentage(ai_count, total),
    };
    let brand_citations = PresenceStat {
        count: cited_count,
        percentage: percentage(cited_count, ai_count),
    };

    let average_score = if total > 0 {
        round1(results.iter().map(|r| r.ai_visibility_score).sum::<f64>() / total as f64)
    } else {
        0.0
    };

    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for result in results {
        for (domain, count) in &result.google_competitor_citations {
            *totals.entry(domain.clone()).or_insert(0) += u64::from(*count);
        }
    }
    let mut competitor_performance: Vec<CompetitorCitations> = totals
        .into_iter()
        .map(|(domain, citations)| CompetitorCitations { domain, citations })
        .collect();
    competitor_performance.sort_by(|a, b| b.citations.cmp(&a.citations));

    let recommendations = recommendations(results, average_score);

    RunSummary {
        total_queries: total,
        queries_failed,
        processing_time_ms,
        performance_mode: mode,
        ai_overview_presence: ai_presence,
        brand_citations,
        ai_visibility_scoring: ScoreStat {
            average_score,
            max_score: 100.0,
        },
        competitor_performance,
        recommendations,
    }
}

fn percentage(count: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        round1(count as f64 / denominator as f64 * 100.0)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Plain-text guidance keyed off the average score and citation pattern.
fn recommendations(results: &[QueryAnalysis], average_score: f64) -> Vec<String> {
    let mut out = Vec::new();

    if average_score < 30.0 {
        out.push(
            "Very low AI visibility. Focus on creating AI-optimized content.".to_string(),
        );
        out.push(
            "Target informational queries where AI Overviews are more likely to appear."
                .to_string(),
        );
    } else if average_score < 60.0 {
        out.push(
            "Brand appears in some AI features. Optimize content for featured snippets."
                .to_string(),
        );
        out.push(
            "Improve content authority and factual accuracy for AI citation eligibility."
                .to_string(),
        );
    } else {
        out.push("Strong AI visibility. Maintain and expand current strategies.".to_string());
        out.push("Monitor competitor activities and defend your AI presence.".to_string());
    }

    let any_ai = results.iter().any(|r| r.google_ai_overview_present);
    let any_cited = results.iter().any(|r| r.google_brand_cited);
    if any_ai && !any_cited {
        out.push(
            "AI Overviews are present but not citing your brand. Focus on E-A-T content optimization."
                .to_string(),
        );
    }

    out
}
