use serde::{Deserialize, Serialize};

// --- Request types ---

/// Search engine a SERP task runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Google,
    Bing,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Google => write!(f, "google"),
            Engine::Bing => write!(f, "bing"),
        }
    }
}

/// One task in a `serp/{engine}/organic/live/advanced` request body.
/// DataForSEO expects an array of these even for a single keyword.
#[derive(Debug, Clone, Serialize)]
pub struct SerpTask {
    pub keyword: String,
    pub location_code: u32,
    pub language_code: String,
    pub device: String,
    /// Google tasks carry an OS hint; Bing tasks omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
}

/// One task in a `dataforseo_labs/google/keywords_for_site/live` request body.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordsForSiteTask {
    pub target: String,
    pub location_code: u32,
    pub language_code: String,
    pub limit: u32,
    /// Raw filter expression, e.g. `[["keyword_info.search_volume", ">", 100]]`.
    pub filters: serde_json::Value,
}

// --- Response envelope ---

/// Top-level envelope shared by every v3 endpoint. DataForSEO reports
/// success both via the HTTP status and an in-body `status_code` (20000).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub status_code: Option<u32>,
    pub status_message: Option<String>,
    #[serde(default = "Vec::new")]
    pub tasks: Vec<TaskEnvelope<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskEnvelope<T> {
    pub id: Option<String>,
    pub status_code: Option<u32>,
    pub status_message: Option<String>,
    pub result: Option<Vec<T>>,
}

// --- SERP response types ---

/// One result page for one keyword. Every field is optional: partial and
/// empty responses are valid zero-information outcomes, never errors.
#[derive(Debug, Clone, Deserialize)]
pub struct SerpResult {
    pub keyword: Option<String>,
    pub se_domain: Option<String>,
    pub items_count: Option<u32>,
    pub items: Option<Vec<SerpItem>>,
}

/// A single SERP feature entry. The `type` tag decides how downstream
/// analysis treats it; unrecognized tags are carried through untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerpItem {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
    /// AI-overview citation sources, newer response shape.
    pub references: Option<Vec<SerpLink>>,
    /// Generic sub-items: AI-overview citations in some response variants,
    /// the question list under a people_also_ask block.
    pub items: Option<Vec<SerpSubItem>>,
    /// Legacy AI-overview citation shape, URL only.
    pub links: Option<Vec<SerpLink>>,
}

/// A cited source inside an AI overview (`references` / `links` entries).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerpLink {
    pub title: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
}

/// A nested element of a SERP feature (`items` entries).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerpSubItem {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
}

// --- Labs (keyword discovery) response types ---

/// One entry from `keywords_for_site`. The keyword lives either directly
/// on the item or nested in `keyword_info`, depending on the API version.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordItem {
    pub keyword: Option<String>,
    pub keyword_info: Option<KeywordInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordInfo {
    pub keyword: Option<String>,
    pub search_volume: Option<i64>,
}

impl KeywordItem {
    /// Resolve the keyword text across both known response shapes.
    pub fn keyword_text(&self) -> Option<&str> {
        self.keyword_info
            .as_ref()
            .and_then(|info| info.keyword.as_deref())
            .or(self.keyword.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_text_prefers_keyword_info() {
        let item = KeywordItem {
            keyword: Some("outer".to_string()),
            keyword_info: Some(KeywordInfo {
                keyword: Some("inner".to_string()),
                search_volume: Some(500),
            }),
        };
        assert_eq!(item.keyword_text(), Some("inner"));
    }

    #[test]
    fn keyword_text_falls_back_to_flat_field() {
        let item = KeywordItem {
            keyword: Some("outer".to_string()),
            keyword_info: None,
        };
        assert_eq!(item.keyword_text(), Some("outer"));
    }

    #[test]
    fn serp_response_tolerates_missing_fields() {
        let raw = r#"{"status_code": 20000, "tasks": [{"id": "x", "status_code": 20000, "result": [{"keyword": "running shoes"}]}]}"#;
        let resp: ApiResponse<SerpResult> = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.status_code, Some(20000));
        let result = resp.tasks[0].result.as_ref().unwrap();
        assert!(result[0].items.is_none());
    }
}
