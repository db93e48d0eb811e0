//! Autocomplete suggestion fetcher
//!
//! Fetches suggestions for a not-yet-committed query from Google's
//! suggest endpoint.

use crate::network::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Trait for suggestion sources
#[async_trait]
pub trait SuggestionFetcher: Send + Sync {
    /// Fetch ordered suggestions for a query; empty queries yield no
    /// suggestions without a network call
    async fn fetch(&self, query: &str, locale: &str) -> Result<Vec<String>>;
}

/// Google suggest endpoint (chrome output format)
pub struct GoogleSuggest {
    client: HttpClient,
    base_url: String,
}

impl GoogleSuggest {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: "https://suggestqueries.google.com/complete/search".to_string(),
        }
    }

    /// Override the endpoint, for tests against a local mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SuggestionFetcher for GoogleSuggest {
    async fn fetch(&self, query: &str, locale: &str) -> Result<Vec<String>> {
        if query.is_empty() {
            return Ok(vec![]);
        }

        let mut params = HashMap::new();
        params.insert("q".to_string(), query.to_string());
        params.insert("output".to_string(), "chrome".to_string());
        params.insert("hl".to_string(), locale.to_string());

        let response = self.client.get_with_params(&self.base_url, params, locale).await?;

        if !response.is_success() {
            anyhow::bail!("suggest endpoint returned HTTP {}", response.status);
        }

        parse_suggestions(&response.text)
    }
}

/// Parse the endpoint's `[query, [suggestions...], ...]` array shape
pub fn parse_suggestions(body: &str) -> Result<Vec<String>> {
    let json: serde_json::Value = serde_json::from_str(body)?;

    let suggestions = json
        .as_array()
        .and_then(|arr| arr.get(1))
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suggestions() {
        let body = r#"["cat",["cats","category","caterpillar"],[],{"google:suggesttype":["QUERY","QUERY","QUERY"]}]"#;
        let suggestions = parse_suggestions(body).unwrap();
        assert_eq!(suggestions, vec!["cats", "category", "caterpillar"]);
    }

    #[test]
    fn test_parse_no_suggestions() {
        let suggestions = parse_suggestions(r#"["zzzz",[]]"#).unwrap();
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_parse_skips_non_strings() {
        let suggestions = parse_suggestions(r#"["q",["a",7,"b"]]"#).unwrap();
        assert_eq!(suggestions, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(parse_suggestions("<html>").is_err());
    }

    #[tokio::test]
    async fn test_empty_query_short_circuits() {
        let fetcher = GoogleSuggest::new(HttpClient::new().unwrap())
            .with_base_url("http://127.0.0.1:1/unreachable");
        let suggestions = fetcher.fetch("", "en").await.unwrap();
        assert!(suggestions.is_empty());
    }
}
