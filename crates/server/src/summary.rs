//! HTTP implementation of the summary collaborator.
//!
//! Talks to a HuggingFace-style inference endpoint. Failures never reach
//! request handlers: `SummaryRuntime` converts any error from this client
//! into the deterministic fallback sentence.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use pricedrop_agent::SummaryClient;
use pricedrop_core::config::SummaryConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

pub struct HttpSummaryClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    summary_text: String,
}

impl HttpSummaryClient {
    pub fn from_config(config: &SummaryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build summary HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }
}

#[async_trait]
impl SummaryClient for HttpSummaryClient {
    async fn summarize(&self, text: &str) -> Result<String> {
        let mut request = self.client.post(self.endpoint()).json(&json!({ "inputs": text }));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .context("summarization request failed")?
            .error_for_status()
            .context("summarization endpoint returned an error status")?;

        let payload: Vec<SummaryPayload> =
            response.json().await.context("summarization response was not valid JSON")?;

        payload
            .into_iter()
            .next()
            .map(|entry| entry.summary_text)
            .ok_or_else(|| anyhow!("summarization response was empty"))
    }
}
