use crate::config::ShodanConfig;
use crate::model::SearchResults;
use anyhow::{anyhow, bail};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Thin client for the Shodan host search endpoint
pub struct ShodanClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ShodanClient {
    /// Build a client, reading the API key from the configured environment variable
    pub fn new(config: &ShodanConfig) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &ShodanConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn favicon_query(favicon_hash: i32) -> String {
        format!("http.favicon.hash:{favicon_hash}")
    }

    /// Look up hosts serving a favicon with this hash.
    ///
    /// Returns `None` without touching the network when no API key is set,
    /// and `None` after printing the message for any API failure.
    pub async fn search(&self, favicon_hash: i32) -> Option<SearchResults> {
        let Some(api_key) = self.api_key.as_deref() else {
            println!("Shodan API Key not found.");
            return None;
        };

        let query = Self::favicon_query(favicon_hash);
        match self.host_search(api_key, &query).await {
            Ok(results) => {
                log::debug!(
                    "Shodan returned {} matches ({} total) for {}",
                    results.matches.len(),
                    results.total,
                    query
                );
                Some(results)
            }
            Err(e) => {
                log::warn!("Shodan search for {query} failed: {e}");
                println!("Error: {e}");
                None
            }
        }
    }

    async fn host_search(&self, api_key: &str, query: &str) -> anyhow::Result<SearchResults> {
        let endpoint = format!("{}/shodan/host/search", self.base_url);
        log::debug!("GET {endpoint}?key=<redacted>&query={query}");

        let response = self
            .client
            .get(&endpoint)
            .query(&[("key", api_key), ("query", query)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let payload: Value = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => bail!("Shodan returned HTTP {status}"),
            Err(e) => bail!("Unable to parse JSON response: {e}"),
        };

        if let Some(message) = payload.get("error").and_then(Value::as_str) {
            return Err(anyhow!(message.to_string()));
        }
        if !status.is_success() {
            bail!("Shodan returned HTTP {status}");
        }

        Ok(serde_json::from_value(payload)?)
    }
}
