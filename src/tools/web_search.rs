//! Web search via the Tavily search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::Tool;
use crate::core::{Config, ResearchError, Result, ToolCall};

/// Ranked web search returning `[{url, content}]` as JSON text.
pub struct TavilySearchTool {
    client: Client,
    base_url: String,
    api_key: String,
    max_results: u32,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SearchHit {
    url: String,
    content: String,
}

impl TavilySearchTool {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        max_results: u32,
    ) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_results,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.search.base_url.clone(),
            config.tavily_api_key()?,
            config.search.max_results,
        )
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        "tavily_search_results_json"
    }

    fn description(&self) -> &str {
        "A search engine optimized for comprehensive, accurate, and trusted results. \
         Useful for answering questions about current events and market data. \
         Input should be a search query."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "search query to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> Result<String> {
        let query = call
            .get_string("query")
            .ok_or_else(|| ResearchError::tool("Missing 'query' argument"))?;

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&SearchRequest {
                api_key: &self.api_key,
                query: &query,
                max_results: self.max_results,
            })
            .send()
            .await
            .map_err(|e| ResearchError::tool(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResearchError::tool(format!(
                "Search API error ({}): {}",
                status, body
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::tool(format!("Invalid search response: {}", e)))?;

        debug!(query = %query, hits = parsed.results.len(), "Search complete");
        Ok(serde_json::to_string(&parsed.results)?)
    }
}
