//! Per-query analysis: folds classified Google and Bing page features into
//! one immutable [`QueryAnalysis`] for a brand and its competitors.

use std::collections::BTreeMap;

use chrono::Utc;
use dataforseo_client::SerpItem;
use rankscope_common::{Domain, PageFeature, QueryAnalysis};

use crate::citations::extract_citations;
use crate::classify::{classify_bing_features, classify_google_features};
use crate::scoring::{
    competitor_score, dominance_rank, visibility_score, ScoreWeights, VisibilitySignals,
};

pub struct Analyzer {
    brand: Domain,
    /// Canonical competitor domains, input order, empties and duplicates dropped.
    competitors: Vec<Domain>,
    weights: ScoreWeights,
}

impl Analyzer {
    pub fn new(brand_domain: &str, competitor_domains: &[String]) -> Self {
        Self::with_weights(brand_domain, competitor_domains, ScoreWeights::default())
    }

    pub fn with_weights(
        brand_domain: &str,
        competitor_domains: &[String],
        weights: ScoreWeights,
    ) -> Self {
        let brand = Domain::normalize(brand_domain);
        let mut competitors: Vec<Domain> = Vec::new();
        for raw in competitor_domains {
            let canonical = Domain::normalize(raw);
            if !canonical.is_empty() && canonical != brand && !competitors.contains(&canonical) {
                competitors.push(canonical);
            }
        }
        Self {
            brand,
            competitors,
            weights,
        }
    }

    pub fn brand(&self) -> &Domain {
        &self.brand
    }

    pub fn competitors(&self) -> &[Domain] {
        &self.competitors
    }

    /// Analyze one query's pages. A failed fetch shows up here as an empty
    /// item slice, which is indistinguishable from a feature-less page by
    /// design; the caller decides whether the query is scorable at all.
    pub fn analyze(
        &self,
        query: &str,
        location: &str,
        device: &str,
        google_items: &[SerpItem],
        bing_items: &[SerpItem],
    ) -> QueryAnalysis {
        let google = classify_google_features(google_items);
        let bing = classify_bing_features(bing_items);

        // At most one AI answer per page: the first one found wins, any
        // further panels are ignored.
        let ai_answer = google
            .iter()
            .find_map(|f| match f {
                PageFeature::AiAnswer { citations } => Some(citations.as_slice()),
                _ => None,
            });

        let cited_domains = ai_answer.map(extract_citations).unwrap_or_default();

        let brand_cited =
            !self.brand.is_empty() && cited_domains.iter().any(|d| *d == self.brand);

        let mut competitor_citations: BTreeMap<String, u32> = BTreeMap::new();
        for cited in &cited_domains {
            for competitor in &self.competitors {
                if cited == competitor {
                    *competitor_citations
                        .entry(competitor.as_str().to_string())
                        .or_insert(0) += 1;
                }
            }
        }

        let featured_snippet_present = google
            .iter()
            .any(|f| matches!(f, PageFeature::FeaturedSnippet));
        let knowledge_graph_present = google
            .iter()
            .any(|f| matches!(f, PageFeature::KnowledgeGraph));

        let (paa_present, paa_queries) = collect_paa(&google);
        let (bing_paa_present, bing_paa_queries) = collect_paa(&bing);

        let mut bing_ai_features: Vec<String> = Vec::new();
        let mut bing_brand_visibility = false;
        for feature in &bing {
            if let PageFeature::AiMarker { label, domain } = feature {
                bing_ai_features.push(label.clone());
                if !self.brand.is_empty() && domain.as_ref() == Some(&self.brand) {
                    bing_brand_visibility = true;
                }
            }
        }

        let ai_answer_present = ai_answer.is_some();
        let signals = VisibilitySignals {
            ai_answer_present,
            brand_cited,
            featured_snippet_present,
            knowledge_graph_present,
            people_also_ask_present: paa_present,
            secondary_ai_feature_count: bing_ai_features.len(),
            secondary_brand_visible: bing_brand_visibility,
        };
        let ai_visibility_score = visibility_score(&signals, &self.weights);

        let competitor_scored: Vec<(Domain, f64)> = self
            .competitors
            .iter()
            .map(|c| {
                let count = competitor_citations.get(c.as_str()).copied().unwrap_or(0);
                (c.clone(), competitor_score(count, ai_answer_present))
            })
            .collect();

        let ai_dominance_rank = dominance_rank(ai_visibility_score, &competitor_scored);

        let competitor_ai_scores: BTreeMap<String, f64> = competitor_scored
            .into_iter()
            .map(|(d, s)| (d.as_str().to_string(), s))
            .collect();

        QueryAnalysis {
            query: query.to_string(),
            location: location.to_string(),
            device: device.to_string(),
            timestamp: Utc::now(),
            google_ai_overview_present: ai_answer_present,
            google_ai_citations: cited_domains,
            google_brand_cited: brand_cited,
            google_competitor_citations: competitor_citations,
            featured_snippet_present,
            knowledge_graph_present,
            people_also_ask_present: paa_present,
            people_also_ask_queries: paa_queries,
            bing_ai_features,
            bing_brand_visibility,
            bing_people_also_ask_present: bing_paa_present,
            bing_people_also_ask_queries: bing_paa_queries,
            ai_visibility_score,
            competitor_ai_scores,
            ai_dominance_rank,
        }
    }
}

fn collect_paa(features: &[PageFeature]) -> (bool, Vec<String>) {
    let mut present = false;
    let mut questions = Vec::new();
    for feature in features {
        if let PageFeature::PeopleAlsoAsk { questions: q } = feature {
            present = true;
            questions.extend(q.iter().cloned());
        }
    }
    (present, questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataforseo_client::SerpLink;

    fn ai_overview(domains: &[&str]) -> SerpItem {
        SerpItem {
            item_type: Some("ai_overview".to_string()),
            references: Some(
                domains
                    .iter()
                    .map(|d| SerpLink {
                        title: None,
                        url: None,
                        domain: Some(d.to_string()),
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn brand_matching_goes_through_normalization() {
        let analyzer = Analyzer::new("www.mayoclinic.org", &[]);
        let result = analyzer.analyze(
            "heart disease",
            "United States",
            "desktop",
            &[ai_overview(&["mayoclinic.org", "webmd.com"])],
            &[],
        );

        assert!(result.google_ai_overview_present);
        assert!(result.google_brand_cited);
        assert_eq!(result.google_ai_citations.len(), 2);
        assert!(result.ai_visibility_score >= 70.0);
    }

    #[test]
    fn competitor_counting_is_single_increment() {
        let analyzer = Analyzer::new("nike.com", &["adidas.com".to_string()]);
        let result = analyzer.analyze(
            "running shoes",
            "United States",
            "desktop",
            &[ai_overview(&["adidas.com", "adidas.com", "puma.com"])],
            &[],
        );

        assert_eq!(result.google_competitor_citations.get("adidas.com"), Some(&2));
        // puma.com is not tracked, so it is absent rather than zero.
        assert!(!result.google_competitor_citations.contains_key("puma.com"));
    }

    #[test]
    fn first_ai_overview_wins() {
        let analyzer = Analyzer::new("nike.com", &[]);
        let result = analyzer.analyze(
            "running shoes",
            "United States",
            "desktop",
            &[ai_overview(&["runnersworld.com"]), ai_overview(&["nike.com"])],
            &[],
        );

        assert_eq!(
            result.google_ai_citations,
            vec![Domain::normalize("runnersworld.com")]
        );
        assert!(!result.google_brand_cited);
    }

    #[test]
    fn constructor_drops_empty_and_brand_equal_competitors() {
        let analyzer = Analyzer::new(
            "nike.com",
            &["adidas.com".to_string(), "".to_string(), "nike.com".to_string()],
        );
        // Empty and brand-equal competitor inputs are dropped at construction.
        assert_eq!(analyzer.competitors().len(), 1);
    }

    #[test]
    fn empty_pages_score_zero_with_rank_one_alone() {
        let analyzer = Analyzer::new("nike.com", &[]);
        let result = analyzer.analyze("running shoes", "United States", "desktop", &[], &[]);

        assert!(!result.google_ai_overview_present);
        assert_eq!(result.ai_visibility_score, 0.0);
        assert_eq!(result.ai_dominance_rank, 1);
        assert!(result.google_ai_citations.is_empty());
    }
}
