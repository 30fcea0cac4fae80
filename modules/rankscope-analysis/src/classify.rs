//! SERP item classification: maps the provider's declared `type` tags onto
//! typed page features. A pure lookup per engine; unrecognized tags become
//! `Other` and are ignored by the scorer.

use dataforseo_client::SerpItem;
use rankscope_common::{Domain, PageFeature};

/// Classify a Google result page's items.
pub fn classify_google_features(items: &[SerpItem]) -> Vec<PageFeature> {
    items
        .iter()
        .map(|item| match item.item_type.as_deref() {
            Some("ai_overview") => PageFeature::AiAnswer {
                citations: crate::citations::select_citation_source(item),
            },
            Some("featured_snippet") => PageFeature::FeaturedSnippet,
            Some("knowledge_graph") => PageFeature::KnowledgeGraph,
            Some("people_also_ask") => PageFeature::PeopleAlsoAsk {
                questions: question_titles(item),
            },
            _ => PageFeature::Other,
        })
        .collect()
}

/// Classify a Bing result page's items. Bing has no citation-bearing AI
/// overview; `answer_box`, `instant_answer`, and `knowledge_graph` all act
/// as AI-presence markers carrying at most the item's own domain.
pub fn classify_bing_features(items: &[SerpItem]) -> Vec<PageFeature> {
    items
        .iter()
        .map(|item| match item.item_type.as_deref() {
            Some(tag @ ("answer_box" | "instant_answer" | "knowledge_graph")) => {
                let domain = item
                    .domain
                    .as_deref()
                    .filter(|d| !d.trim().is_empty())
                    .map(Domain::normalize)
                    .or_else(|| {
                        let d = Domain::normalize(item.url.as_deref().unwrap_or(""));
                        (!d.is_empty()).then_some(d)
                    });
                PageFeature::AiMarker {
                    label: tag.to_string(),
                    domain,
                }
            }
            Some("people_also_ask") => PageFeature::PeopleAlsoAsk {
                questions: question_titles(item),
            },
            _ => PageFeature::Other,
        })
        .collect()
}

/// Question texts of a people_also_ask block: the titles of its sub-items.
fn question_titles(item: &SerpItem) -> Vec<String> {
    item.items
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|sub| sub.title.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataforseo_client::SerpSubItem;

    fn item(tag: &str) -> SerpItem {
        SerpItem {
            item_type: Some(tag.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn google_table_maps_known_tags() {
        let features = classify_google_features(&[
            item("ai_overview"),
            item("featured_snippet"),
            item("knowledge_graph"),
            item("people_also_ask"),
            item("organic"),
        ]);

        assert!(matches!(features[0], PageFeature::AiAnswer { .. }));
        assert_eq!(features[1], PageFeature::FeaturedSnippet);
        assert_eq!(features[2], PageFeature::KnowledgeGraph);
        assert!(matches!(features[3], PageFeature::PeopleAlsoAsk { .. }));
        assert_eq!(features[4], PageFeature::Other);
    }

    #[test]
    fn bing_ai_markers_carry_item_domain() {
        let mut answer = item("answer_box");
        answer.url = Some("https://www.nike.com/help".to_string());
        let features = classify_bing_features(&[answer, item("instant_answer"), item("organic")]);

        assert_eq!(
            features[0],
            PageFeature::AiMarker {
                label: "answer_box".to_string(),
                domain: Some(Domain::normalize("nike.com")),
            }
        );
        assert_eq!(
            features[1],
            PageFeature::AiMarker {
                label: "instant_answer".to_string(),
                domain: None,
            }
        );
        assert_eq!(features[2], PageFeature::Other);
    }

    #[test]
    fn bing_knowledge_graph_is_an_ai_marker() {
        let features = classify_bing_features(&[item("knowledge_graph")]);
        assert!(matches!(
            &features[0],
            PageFeature::AiMarker { label, .. } if label == "knowledge_graph"
        ));
    }

    #[test]
    fn paa_questions_come_from_sub_item_titles() {
        let mut paa = item("people_also_ask");
        paa.items = Some(vec![
            SerpSubItem {
                title: Some("What causes diabetes?".to_string()),
                ..Default::default()
            },
            SerpSubItem {
                title: None,
                ..Default::default()
            },
            SerpSubItem {
                title: Some("Is diabetes curable?".to_string()),
                ..Default::default()
            },
        ]);

        let features = classify_google_features(&[paa]);
        assert_eq!(
            features[0],
            PageFeature::PeopleAlsoAsk {
                questions: vec![
                    "What causes diabetes?".to_string(),
                    "Is diabetes curable?".to_string(),
                ],
            }
        );
    }
}
