pub mod error;
pub mod types;

pub use error::{DataForSeoError, Result};
pub use types::{
    ApiResponse, Engine, KeywordItem, KeywordsForSiteTask, SerpItem, SerpLink, SerpResult,
    SerpSubItem, SerpTask,
};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::TaskEnvelope;

const BASE_URL: &str = "https://api.dataforseo.com/v3";

/// Every request carries its own timeout; a stalled upstream call fails
/// that one (keyword, engine) pair and nothing else.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// In-body status code DataForSEO uses for success.
const STATUS_OK: u32 = 20000;

/// Default search-volume floor for keyword discovery.
const KEYWORD_VOLUME_FLOOR: i64 = 100;

/// Map a human-readable location name to a DataForSEO location code.
/// Exact matches first, then substring fallbacks, then the US default.
pub fn location_code(location: &str) -> u32 {
    match location {
        "United States" | "New York,United States" | "Los Angeles,United States" => 2840,
        "United Kingdom" | "London,England,United Kingdom" => 2826,
        "New Zealand" | "Auckland,New Zealand" => 2554,
        "Australia" | "Sydney,Australia" => 2036,
        "Canada" | "Toronto,Canada" => 2124,
        other => {
            let lower = other.to_lowercase();
            if lower.contains("new zealand") {
                2554
            } else if lower.contains("united kingdom") || lower.contains("uk") {
                2826
            } else if lower.contains("australia") {
                2036
            } else if lower.contains("canada") {
                2124
            } else {
                2840
            }
        }
    }
}

/// Map a language name to a DataForSEO language code, defaulting to English.
pub fn language_code(language: &str) -> &'static str {
    match language {
        "Spanish" => "es",
        "French" => "fr",
        "German" => "de",
        _ => "en",
    }
}

pub struct DataForSeoClient {
    client: reqwest::Client,
    login: String,
    password: String,
}

impl DataForSeoClient {
    pub fn new(login: String, password: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            login,
            password,
        }
    }

    /// POST one task to a v3 endpoint and unwrap the response envelope down
    /// to the task's result list, validating both HTTP and in-body status.
    async fn post_task<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &[B],
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}", BASE_URL, path);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.login, Some(&self.password))
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 402 {
            return Err(DataForSeoError::InsufficientCredits);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(DataForSeoError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_resp: ApiResponse<T> = resp.json().await?;
        if let Some(code) = api_resp.status_code {
            if code != STATUS_OK {
                return Err(DataForSeoError::Task {
                    status_code: code,
                    message: api_resp.status_message.unwrap_or_default(),
                });
            }
        }

        let task: TaskEnvelope<T> = api_resp
            .tasks
            .into_iter()
            .next()
            .ok_or_else(|| DataForSeoError::Parse("response contained no tasks".to_string()))?;

        if let Some(code) = task.status_code {
            if code != STATUS_OK {
                return Err(DataForSeoError::Task {
                    status_code: code,
                    message: task.status_message.unwrap_or_default(),
                });
            }
        }

        Ok(task.result.unwrap_or_default())
    }

    /// Fetch one live SERP for a keyword. Returns the feature items of the
    /// first result page; an item-less page comes back as an empty list.
    pub async fn fetch_serp(
        &self,
        engine: Engine,
        keyword: &str,
        location: &str,
        device: &str,
        language: &str,
    ) -> Result<Vec<SerpItem>> {
        let task = SerpTask {
            keyword: keyword.to_string(),
            location_code: location_code(location),
            language_code: language_code(language).to_string(),
            device: device.to_string(),
            os: match engine {
                Engine::Google => Some(if device == "desktop" {
                    "windows".to_string()
                } else {
                    "android".to_string()
                }),
                Engine::Bing => None,
            },
        };

        let path = format!("serp/{}/organic/live/advanced", engine);
        tracing::debug!(keyword, engine = %engine, "Fetching live SERP");

        let results: Vec<SerpResult> = self.post_task(&path, &[task]).await?;
        let items = results
            .into_iter()
            .next()
            .and_then(|r| r.items)
            .unwrap_or_default();

        tracing::debug!(keyword, engine = %engine, items = items.len(), "SERP fetched");
        Ok(items)
    }

    /// Discover keywords a domain already ranks for, via DataForSEO Labs.
    /// Filters out low-volume terms and returns at most `keep` keywords.
    pub async fn keywords_for_site(
        &self,
        target: &str,
        location: &str,
        language: &str,
        limit: u32,
        keep: usize,
    ) -> Result<Vec<String>> {
        let task = KeywordsForSiteTask {
            target: target.to_string(),
            location_code: location_code(location),
            language_code: language_code(language).to_string(),
            limit,
            filters: serde_json::json!([["keyword_info.search_volume", ">", KEYWORD_VOLUME_FLOOR]]),
        };

        tracing::info!(target, limit, "Discovering ranked keywords");

        let results: Vec<KeywordItem> = self
            .post_task("dataforseo_labs/google/keywords_for_site/live", &[task])
            .await?;

        let keywords: Vec<String> = results
            .iter()
            .filter_map(|item| item.keyword_text())
            .map(|kw| kw.to_string())
            .take(keep)
            .collect();

        tracing::info!(target, count = keywords.len(), "Keyword discovery complete");
        Ok(keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_codes_match_known_regions() {
        assert_eq!(location_code("United States"), 2840);
        assert_eq!(location_code("London,England,United Kingdom"), 2826);
        assert_eq!(location_code("Wellington, New Zealand"), 2554);
        assert_eq!(location_code("somewhere unknown"), 2840);
    }

    #[test]
    fn language_codes_default_to_english() {
        assert_eq!(language_code("German"), "de");
        assert_eq!(language_code("Klingon"), "en");
    }

    #[test]
    fn serp_task_omits_os_for_bing() {
        let task = SerpTask {
            keyword: "running shoes".to_string(),
            location_code: 2840,
            language_code: "en".to_string(),
            device: "desktop".to_string(),
            os: None,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("os").is_none());
    }
}
