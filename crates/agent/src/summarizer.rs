use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

/// Shown whenever no summary can be produced. Deterministic so the
/// degraded path is indistinguishable from run to run.
pub const FALLBACK_SUMMARY: &str = "AI summary temporarily unavailable. This is a premium \
     product with excellent features and competitive pricing.";

#[async_trait]
pub trait SummaryClient: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryOutcome {
    Generated { summary: String },
    Fallback { summary: String },
}

impl SummaryOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated { summary } | Self::Fallback { summary } => summary,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }
}

/// Holds the optionally-absent summary client. The client is injected at
/// bootstrap rather than read from process-global state so the absent
/// branch is trivially testable.
#[derive(Clone, Default)]
pub struct SummaryRuntime {
    client: Option<Arc<dyn SummaryClient>>,
}

impl SummaryRuntime {
    pub fn new(client: Option<Arc<dyn SummaryClient>>) -> Self {
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Summarize a product blurb. Total: any client failure collapses to
    /// the deterministic fallback sentence.
    pub async fn summarize(&self, name: &str, description: &str) -> SummaryOutcome {
        let client = match &self.client {
            Some(client) => client,
            None => return SummaryOutcome::Fallback { summary: FALLBACK_SUMMARY.to_string() },
        };

        let text = if description.trim().is_empty() {
            name.to_string()
        } else {
            format!("{name}. {description}")
        };

        match client.summarize(&text).await {
            Ok(summary) if !summary.trim().is_empty() => {
                SummaryOutcome::Generated { summary: summary.trim().to_string() }
            }
            Ok(_) => SummaryOutcome::Fallback { summary: FALLBACK_SUMMARY.to_string() },
            Err(error) => {
                warn!(
                    event_name = "agent.summary.degraded",
                    error = %error,
                    "summary client failed, serving fallback"
                );
                SummaryOutcome::Fallback { summary: FALLBACK_SUMMARY.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedClient {
        response: Result<String, String>,
    }

    #[async_trait]
    impl SummaryClient for CannedClient {
        async fn summarize(&self, _text: &str) -> Result<String> {
            match &self.response {
                Ok(summary) => Ok(summary.clone()),
                Err(message) => Err(anyhow::anyhow!(message.clone())),
            }
        }
    }

    #[tokio::test]
    async fn absent_client_serves_the_fallback() {
        let runtime = SummaryRuntime::disabled();
        let outcome = runtime.summarize("Headphones", "Noise cancelling.").await;
        assert_eq!(outcome, SummaryOutcome::Fallback { summary: FALLBACK_SUMMARY.to_string() });
        assert!(!runtime.is_enabled());
    }

    #[tokio::test]
    async fn failing_client_degrades_instead_of_propagating() {
        let runtime = SummaryRuntime::new(Some(Arc::new(CannedClient {
            response: Err("upstream timeout".to_string()),
        })));
        let outcome = runtime.summarize("Headphones", "Noise cancelling.").await;
        assert!(!outcome.is_generated());
        assert_eq!(outcome.text(), FALLBACK_SUMMARY);
    }

    #[tokio::test]
    async fn successful_client_response_is_passed_through_trimmed() {
        let runtime = SummaryRuntime::new(Some(Arc::new(CannedClient {
            response: Ok("  Compact flagship headphones.  ".to_string()),
        })));
        let outcome = runtime.summarize("Headphones", "Noise cancelling.").await;
        assert_eq!(
            outcome,
            SummaryOutcome::Generated { summary: "Compact flagship headphones.".to_string() }
        );
    }

    #[tokio::test]
    async fn blank_client_response_counts_as_a_failure() {
        let runtime = SummaryRuntime::new(Some(Arc::new(CannedClient {
            response: Ok("   ".to_string()),
        })));
        let outcome = runtime.summarize("Headphones", "").await;
        assert_eq!(outcome.text(), FALLBACK_SUMMARY);
    }
}
