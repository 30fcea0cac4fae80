//! Citation extraction from an AI-overview item. The provider reports
//! citations under three different field names depending on API version;
//! they are alternatives for the same data, never merged.

use dataforseo_client::SerpItem;
use rankscope_common::{Citation, Domain};

/// Pick the winning citation source list from an AI-overview item.
///
/// Fixed priority: `references`, then the `items` sub-list, then the
/// legacy `links` list. The first non-empty list wins outright; later
/// sources are never consulted, so a citation reported under two field
/// names is counted once.
pub fn select_citation_source(item: &SerpItem) -> Vec<Citation> {
    if let Some(refs) = &item.references {
        if !refs.is_empty() {
            return refs
                .iter()
                .map(|r| Citation {
                    domain: r.domain.clone(),
                    url: r.url.clone(),
                })
                .collect();
        }
    }

    if let Some(subs) = &item.items {
        if !subs.is_empty() {
            return subs
                .iter()
                .map(|s| Citation {
                    domain: s.domain.clone(),
                    url: s.url.clone(),
                })
                .collect();
        }
    }

    if let Some(links) = &item.links {
        if !links.is_empty() {
            return links
                .iter()
                .map(|l| Citation {
                    domain: l.domain.clone(),
                    url: l.url.clone(),
                })
                .collect();
        }
    }

    Vec::new()
}

/// Resolve raw citations to canonical domains, in order, duplicates kept.
///
/// Per entry the explicit `domain` field wins; otherwise the host is
/// parsed out of `url`. Entries resolving to an empty domain are dropped
/// silently: an unusable citation contributes nothing, it is not an error.
pub fn extract_citations(citations: &[Citation]) -> Vec<Domain> {
    citations
        .iter()
        .filter_map(|c| {
            let domain = match c.domain.as_deref() {
                Some(d) if !d.trim().is_empty() => Domain::normalize(d),
                _ => Domain::normalize(c.url.as_deref().unwrap_or("")),
            };
            (!domain.is_empty()).then_some(domain)
        })
        .collect()
}
