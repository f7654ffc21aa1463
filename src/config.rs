use std::env;

use tracing::debug;

use crate::arxiv::types::{SortBy, UnknownSortBy};
use crate::search::SearchOptions;

pub const DEFAULT_MAX_RESULTS: usize = 10;
/// arXiv rejects pages larger than this; it also bounds a single search.
pub const MAX_RESULTS_LIMIT: usize = 100;
pub const DEFAULT_MODEL: &str = "Qwen/Qwen3-30B-A3B-Thinking-2507";
pub const DEFAULT_BASE_URL: &str = "https://api-inference.modelscope.cn/v1";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Settings recognized by the search core.
///
/// Environment variables (all optional, blank values ignored):
/// - `SCHOLAR_MAX_RESULTS`: papers requested per search (1-100, default 10)
/// - `SCHOLAR_SORT_BY`: `relevance`, `lastUpdatedDate` or `submittedDate` (default)
/// - `SCHOLAR_MODEL`: chat model used to write queries
/// - `SCHOLAR_BASE_URL`: OpenAI-compatible API root
/// - `SCHOLAR_API_KEY` / `OPENAI_API_KEY`: bearer token for the chat API
#[derive(Debug, Clone)]
pub struct Config {
    pub max_results: usize,
    pub sort_by: SortBy,
    pub model_name: String,
    pub base_url: String,
    pub api_key: Option<ApiKey>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            sort_by: SortBy::default(),
            model_name: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(raw) = var("SCHOLAR_MAX_RESULTS") {
            let n = raw
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "SCHOLAR_MAX_RESULTS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
            config = config.with_max_results(n);
        }
        if let Some(raw) = var("SCHOLAR_SORT_BY") {
            config.sort_by = raw
                .parse()
                .map_err(|e: UnknownSortBy| ConfigError::InvalidValue {
                    name: "SCHOLAR_SORT_BY",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(model) = var("SCHOLAR_MODEL") {
            config.model_name = model;
        }
        if let Some(base_url) = var("SCHOLAR_BASE_URL") {
            config.base_url = base_url;
        }
        config.api_key = var("SCHOLAR_API_KEY")
            .or_else(|| var("OPENAI_API_KEY"))
            .map(ApiKey);

        debug!(
            max_results = config.max_results,
            sort_by = %config.sort_by,
            model = %config.model_name,
            api_key_set = config.api_key.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, MAX_RESULTS_LIMIT);
        self
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_results: self.max_results,
            sort_by: self.sort_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.max_results, 10);
        assert_eq!(config.sort_by, SortBy::SubmittedDate);
        assert_eq!(config.model_name, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn reads_all_settings() {
        let config = Config::from_lookup(lookup(&[
            ("SCHOLAR_MAX_RESULTS", "25"),
            ("SCHOLAR_SORT_BY", "relevance"),
            ("SCHOLAR_MODEL", " gpt-4o-mini "),
            ("SCHOLAR_BASE_URL", "http://localhost:1234/v1"),
            ("SCHOLAR_API_KEY", "sk-test"),
        ]))
        .unwrap();

        assert_eq!(config.max_results, 25);
        assert_eq!(config.sort_by, SortBy::Relevance);
        assert_eq!(config.model_name, "gpt-4o-mini");
        assert_eq!(config.base_url, "http://localhost:1234/v1");
        assert_eq!(config.api_key.unwrap().expose(), "sk-test");
    }

    #[test]
    fn falls_back_to_openai_key() {
        let config = Config::from_lookup(lookup(&[
            ("SCHOLAR_API_KEY", "   "),
            ("OPENAI_API_KEY", "sk-openai"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.unwrap().expose(), "sk-openai");
    }

    #[test]
    fn rejects_non_numeric_max_results() {
        let err = Config::from_lookup(lookup(&[("SCHOLAR_MAX_RESULTS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("SCHOLAR_MAX_RESULTS"));
    }

    #[test]
    fn rejects_unknown_sort_order() {
        let err = Config::from_lookup(lookup(&[("SCHOLAR_SORT_BY", "citations")])).unwrap_err();
        assert!(err.to_string().contains("citations"));
    }

    #[test]
    fn max_results_is_clamped() {
        assert_eq!(Config::default().with_max_results(0).max_results, 1);
        assert_eq!(Config::default().with_max_results(500).max_results, 100);
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret");
        assert_eq!(format!("{key:?}"), "[REDACTED]");
    }
}
