//! One-shot GET + structural parse, the cheapest strategy and the first
//! candidate for unhinted targets.

use async_trait::async_trait;
use itemscout_core::{ExtractedRecord, Target};

use crate::error::ExtractError;
use crate::fetch::fetch_html;
use crate::selectors::parse_listing;
use crate::strategy::{Strategy, StrategyKind};

pub struct StaticFetchStrategy {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl StaticFetchStrategy {
    #[must_use]
    pub fn new(client: reqwest::Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout_secs,
        }
    }
}

#[async_trait]
impl Strategy for StaticFetchStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StaticFetch
    }

    async fn execute(&self, target: &Target) -> Result<Vec<ExtractedRecord>, ExtractError> {
        let html = fetch_html(&self.client, &target.url, self.timeout_secs).await?;
        let records = parse_listing(&html, &target.url);
        if records.is_empty() {
            return Err(ExtractError::Parse {
                url: target.url.clone(),
                reason: "no listing selector matched".to_owned(),
            });
        }
        tracing::debug!(target = %target.id, records = records.len(), "static fetch parsed listing");
        Ok(records)
    }
}
