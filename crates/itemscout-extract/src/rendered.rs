//! Rendered strategy: headless navigation plus bounded scroll-and-wait
//! cycles for listings that lazy-load items.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use itemscout_core::{ExtractedRecord, Target};

use crate::browser::{BrowserEngine, BrowserPage};
use crate::error::ExtractError;
use crate::selectors::{count_listing_items, parse_listing};
use crate::strategy::{Strategy, StrategyKind};

/// Upper bound on scroll-and-wait cycles per page.
const MAX_SCROLL_ITERATIONS: usize = 10;

/// Stop scrolling once this many items are visible.
const ITEM_CAP: usize = 100;

pub struct RenderedFetchStrategy {
    engine: Arc<dyn BrowserEngine>,
    timeout: Duration,
}

impl RenderedFetchStrategy {
    #[must_use]
    pub fn new(engine: Arc<dyn BrowserEngine>, timeout_secs: u64) -> Self {
        Self {
            engine,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Navigation already happened in `open`; drive the scroll cycles until
    /// the item count stops growing, hits the cap, or iterations run out,
    /// then return the final DOM.
    async fn drive(&self, page: &mut dyn BrowserPage) -> Result<String, ExtractError> {
        page.wait_for_network_idle().await?;
        let mut html = page.content().await?;
        let mut previous = count_listing_items(&html);

        for iteration in 0..MAX_SCROLL_ITERATIONS {
            if previous >= ITEM_CAP {
                break;
            }

            page.scroll_to_bottom().await?;
            page.wait_for_network_idle().await?;
            html = page.content().await?;

            let current = count_listing_items(&html);
            tracing::trace!(iteration, previous, current, "scroll cycle");
            if current <= previous {
                break;
            }
            previous = current;
        }

        Ok(html)
    }
}

#[async_trait]
impl Strategy for RenderedFetchStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RenderedFetch
    }

    async fn execute(&self, target: &Target) -> Result<Vec<ExtractedRecord>, ExtractError> {
        let mut page = self.engine.open(&target.url).await?;

        // The drive phase is raced against the budget *before* teardown so
        // the session is closed on the timeout path too.
        let outcome = tokio::time::timeout(self.timeout, self.drive(page.as_mut())).await;

        if let Err(e) = page.close().await {
            tracing::warn!(target = %target.id, error = %e, "browser session close failed");
        }

        let html = match outcome {
            Err(_) => {
                return Err(ExtractError::Timeout {
                    url: target.url.clone(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
            Ok(Err(e)) => return Err(e),
            Ok(Ok(html)) => html,
        };

        let records = parse_listing(&html, &target.url);
        if records.is_empty() {
            return Err(ExtractError::Parse {
                url: target.url.clone(),
                reason: "no listing selector matched after rendering".to_owned(),
            });
        }
        Ok(records)
    }
}
