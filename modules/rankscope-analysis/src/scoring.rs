//! Visibility scoring. An additive point budget capped at 100: each signal
//! is an independent weighted piece of evidence. The weights are a
//! replaceable table, but historical comparability depends on the defaults
//! staying put.

use rankscope_common::Domain;

/// Point weights for the brand visibility score.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub ai_answer: f64,
    pub brand_cited: f64,
    pub featured_snippet: f64,
    pub knowledge_graph: f64,
    pub people_also_ask: f64,
    /// Points per secondary-engine AI feature, up to `secondary_ai_cap`.
    pub secondary_ai_feature: f64,
    pub secondary_ai_cap: f64,
    pub secondary_brand_visible: f64,
    pub max_score: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            ai_answer: 30.0,
            brand_cited: 40.0,
            featured_snippet: 10.0,
            knowledge_graph: 5.0,
            people_also_ask: 5.0,
            secondary_ai_feature: 2.5,
            secondary_ai_cap: 10.0,
            secondary_brand_visible: 5.0,
            max_score: 100.0,
        }
    }
}

/// Points a competitor earns for being cited at all.
const COMPETITOR_CITED: f64 = 70.0;
/// Points a competitor earns whenever an AI answer is present, cited or not.
/// 70 + 10 never reaches 100; the asymmetry versus brand scoring is intentional.
const COMPETITOR_AI_PRESENT: f64 = 10.0;

/// Boolean signals feeding the visibility score for one query.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilitySignals {
    pub ai_answer_present: bool,
    pub brand_cited: bool,
    pub featured_snippet_present: bool,
    pub knowledge_graph_present: bool,
    pub people_also_ask_present: bool,
    pub secondary_ai_feature_count: usize,
    pub secondary_brand_visible: bool,
}

/// Compute the 0-100 brand visibility score for one query.
pub fn visibility_score(signals: &VisibilitySignals, weights: &ScoreWeights) -> f64 {
    let mut score = 0.0;
    if signals.ai_answer_present {
        score += weights.ai_answer;
    }
    // Additive regardless of AI-answer presence, matching observed behavior.
    if signals.brand_cited {
        score += weights.brand_cited;
    }
    if signals.featured_snippet_present {
        score += weights.featured_snippet;
    }
    if signals.knowledge_graph_present {
        score += weights.knowledge_graph;
    }
    if signals.people_also_ask_present {
        score += weights.people_also_ask;
    }
    score += (signals.secondary_ai_feature_count as f64 * weights.secondary_ai_feature)
        .min(weights.secondary_ai_cap);
    if signals.secondary_brand_visible {
        score += weights.secondary_brand_visible;
    }
    score.min(weights.max_score)
}

/// Score one competitor: cited at least once and/or riding an AI answer.
pub fn competitor_score(citation_count: u32, ai_answer_present: bool) -> f64 {
    let mut score = 0.0;
    if citation_count > 0 {
        score += COMPETITOR_CITED;
    }
    if ai_answer_present {
        score += COMPETITOR_AI_PRESENT;
    }
    score
}

/// 1-based rank of the brand's score among brand + competitors.
///
/// The brand entry is conceptually evaluated first; the descending sort is
/// stable, so on ties the brand outranks any equal-scoring competitor and
/// competitors keep their input order among themselves.
pub fn dominance_rank(brand_score: f64, competitor_scores: &[(Domain, f64)]) -> u32 {
    let mut entries: Vec<(bool, f64)> = Vec::with_capacity(1 + competitor_scores.len());
    entries.push((true, brand_score));
    entries.extend(competitor_scores.iter().map(|(_, s)| (false, *s)));

    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    entries
        .iter()
        .position(|(is_brand, _)| *is_brand)
        .map(|pos| pos as u32 + 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_on() -> VisibilitySignals {
        VisibilitySignals {
            ai_answer_present: true,
            brand_cited: true,
            featured_snippet_present: true,
            knowledge_graph_present: true,
            people_also_ask_present: true,
            secondary_ai_feature_count: 10,
            secondary_brand_visible: true,
        }
    }

    #[test]
    fn exact_weights() {
        let w = ScoreWeights::default();
        let base = VisibilitySignals {
            ai_answer_present: true,
            ..Default::default()
        };
        assert_eq!(visibility_score(&base, &w), 30.0);

        let cited = VisibilitySignals {
            ai_answer_present: true,
            brand_cited: true,
            ..Default::default()
        };
        assert_eq!(visibility_score(&cited, &w), 70.0);
    }

    #[test]
    fn secondary_features_capped_at_ten_points() {
        let w = ScoreWeights::default();
        let three = VisibilitySignals {
            secondary_ai_feature_count: 3,
            ..Default::default()
        };
        assert_eq!(visibility_score(&three, &w), 7.5);

        let many = VisibilitySignals {
            secondary_ai_feature_count: 50,
            ..Default::default()
        };
        assert_eq!(visibility_score(&many, &w), 10.0);
    }

    #[test]
    fn score_never_exceeds_cap() {
        let w = ScoreWeights::default();
        assert_eq!(visibility_score(&all_on(), &w), 100.0);
    }

    #[test]
    fn adding_a_signal_never_decreases_score() {
        let w = ScoreWeights::default();
        let base = VisibilitySignals {
            ai_answer_present: true,
            featured_snippet_present: true,
            ..Default::default()
        };
        let with_brand = VisibilitySignals {
            brand_cited: true,
            ..base
        };
        let with_kg = VisibilitySignals {
            knowledge_graph_present: true,
            ..base
        };
        assert!(visibility_score(&with_brand, &w) >= visibility_score(&base, &w));
        assert!(visibility_score(&with_kg, &w) >= visibility_score(&base, &w));
    }

    #[test]
    fn competitor_score_tops_out_at_eighty() {
        assert_eq!(competitor_score(0, false), 0.0);
        assert_eq!(competitor_score(0, true), 10.0);
        assert_eq!(competitor_score(3, false), 70.0);
        assert_eq!(competitor_score(3, true), 80.0);
    }

    #[test]
    fn dominance_rank_counts_strictly_better_competitors() {
        let comps = vec![
            (Domain::normalize("a.com"), 70.0),
            (Domain::normalize("b.com"), 80.0),
        ];
        assert_eq!(dominance_rank(75.0, &comps), 2);
    }

    #[test]
    fn dominance_rank_brand_wins_ties() {
        let comps = vec![
            (Domain::normalize("a.com"), 50.0),
            (Domain::normalize("b.com"), 50.0),
        ];
        assert_eq!(dominance_rank(50.0, &comps), 1);
    }

    #[test]
    fn dominance_rank_bounds() {
        let comps = vec![
            (Domain::normalize("a.com"), 100.0),
            (Domain::normalize("b.com"), 100.0),
            (Domain::normalize("c.com"), 100.0),
        ];
        let rank = dominance_rank(0.0, &comps);
        assert!(rank >= 1 && rank <= comps.len() as u32 + 1);
        assert_eq!(rank, 4);
        assert_eq!(dominance_rank(10.0, &[]), 1);
    }
}
