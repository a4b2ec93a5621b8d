//! Registry of the available strategies and the candidate ordering used
//! during discovery.

use std::sync::Arc;

use itemscout_core::Target;

use crate::browser::BrowserEngine;
use crate::fallback::GenericFallbackStrategy;
use crate::rendered::RenderedFetchStrategy;
use crate::static_fetch::StaticFetchStrategy;
use crate::strategy::{Strategy, StrategyKind, PRIORITY_ORDER};
use crate::template::PlatformTemplateStrategy;

/// Owns one instance of each available strategy behind the [`Strategy`]
/// trait and hands out candidate orderings per target.
pub struct StrategyCatalog {
    strategies: Vec<Arc<dyn Strategy>>,
}

impl StrategyCatalog {
    /// Build the full catalog with a shared HTTP client.
    ///
    /// When no browser engine is supplied the rendered strategy is omitted;
    /// targets hinted at it then start from the ordinary priority order.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn builtin(
        request_timeout_secs: u64,
        render_timeout_secs: u64,
        user_agent: &str,
        browser: Option<Arc<dyn BrowserEngine>>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(request_timeout_secs))
            .build()?;

        let mut strategies: Vec<Arc<dyn Strategy>> = vec![
            Arc::new(StaticFetchStrategy::new(client.clone(), request_timeout_secs)),
            Arc::new(PlatformTemplateStrategy::new(
                client.clone(),
                request_timeout_secs,
            )),
            Arc::new(GenericFallbackStrategy::new(client, request_timeout_secs)),
        ];
        if let Some(engine) = browser {
            strategies.push(Arc::new(RenderedFetchStrategy::new(
                engine,
                render_timeout_secs,
            )));
        }

        Ok(Self { strategies })
    }

    /// Catalog over caller-supplied strategies. Used by tests and embedders
    /// that stub out network-facing implementations.
    #[must_use]
    pub fn from_strategies(strategies: Vec<Arc<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    #[must_use]
    pub fn by_kind(&self, kind: StrategyKind) -> Option<Arc<dyn Strategy>> {
        self.strategies
            .iter()
            .find(|s| s.kind() == kind)
            .map(Arc::clone)
    }

    /// Lookup by stable id, for strategies recalled from the mapping store.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<Arc<dyn Strategy>> {
        StrategyKind::from_id(id).and_then(|kind| self.by_kind(kind))
    }

    /// Candidate strategies for one target, in the order discovery should
    /// try them.
    ///
    /// A platform hint promotes its strategy to the front; the rest follow
    /// the global priority order, so the generic fallback stays last.
    /// Strategies missing from the catalog (e.g. rendered with no browser
    /// engine) are simply skipped.
    #[must_use]
    pub fn candidates_for(&self, target: &Target) -> Vec<Arc<dyn Strategy>> {
        let hinted = target.effective_hint().map(StrategyKind::for_hint);

        let mut order: Vec<StrategyKind> = Vec::with_capacity(PRIORITY_ORDER.len());
        if let Some(kind) = hinted {
            order.push(kind);
        }
        for kind in PRIORITY_ORDER {
            if Some(kind) != hinted {
                order.push(kind);
            }
        }

        order
            .into_iter()
            .filter_map(|kind| self.by_kind(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use itemscout_core::{ExtractedRecord, PlatformHint};

    use super::*;
    use crate::error::ExtractError;

    struct FixedKind(StrategyKind);

    #[async_trait]
    impl Strategy for FixedKind {
        fn kind(&self) -> StrategyKind {
            self.0
        }

        async fn execute(&self, target: &Target) -> Result<Vec<ExtractedRecord>, ExtractError> {
            Err(ExtractError::Parse {
                url: target.url.clone(),
                reason: "stub".to_owned(),
            })
        }
    }

    fn full_catalog() -> StrategyCatalog {
        StrategyCatalog::from_strategies(
            PRIORITY_ORDER
                .into_iter()
                .map(|kind| Arc::new(FixedKind(kind)) as Arc<dyn Strategy>)
                .collect(),
        )
    }

    fn target(hint: Option<PlatformHint>, url: &str) -> Target {
        Target {
            id: "t".to_owned(),
            display_name: "T".to_owned(),
            url: url.to_owned(),
            platform_hint: hint,
        }
    }

    fn kinds(candidates: &[Arc<dyn Strategy>]) -> Vec<StrategyKind> {
        candidates.iter().map(|s| s.kind()).collect()
    }

    #[test]
    fn unhinted_target_follows_priority_order() {
        let catalog = full_catalog();
        let candidates = catalog.candidates_for(&target(None, "https://plain.example.com"));
        assert_eq!(kinds(&candidates), PRIORITY_ORDER.to_vec());
    }

    #[test]
    fn hint_promotes_its_strategy_to_front() {
        let catalog = full_catalog();
        let candidates = catalog.candidates_for(&target(
            Some(PlatformHint::RenderedCommerce),
            "https://plain.example.com",
        ));
        assert_eq!(
            kinds(&candidates),
            vec![
                StrategyKind::RenderedFetch,
                StrategyKind::StaticFetch,
                StrategyKind::PlatformTemplate,
                StrategyKind::GenericFallback,
            ]
        );
    }

    #[test]
    fn url_derived_hint_applies_without_explicit_hint() {
        let catalog = full_catalog();
        let candidates =
            catalog.candidates_for(&target(None, "https://smartstore.example.com/minong"));
        assert_eq!(kinds(&candidates)[0], StrategyKind::RenderedFetch);
    }

    #[test]
    fn fallback_is_always_last() {
        let catalog = full_catalog();
        for hint in [
            None,
            Some(PlatformHint::RenderedCommerce),
            Some(PlatformHint::TemplateFamily),
        ] {
            let candidates = catalog.candidates_for(&target(hint, "https://plain.example.com"));
            assert_eq!(
                candidates.last().map(|s| s.kind()),
                Some(StrategyKind::GenericFallback)
            );
        }
    }

    #[test]
    fn missing_strategies_are_skipped() {
        // rendered omitted, as when no browser engine is wired in
        let catalog = StrategyCatalog::from_strategies(vec![
            Arc::new(FixedKind(StrategyKind::StaticFetch)) as Arc<dyn Strategy>,
            Arc::new(FixedKind(StrategyKind::PlatformTemplate)),
            Arc::new(FixedKind(StrategyKind::GenericFallback)),
        ]);
        let candidates = catalog.candidates_for(&target(
            Some(PlatformHint::RenderedCommerce),
            "https://plain.example.com",
        ));
        assert_eq!(
            kinds(&candidates),
            vec![
                StrategyKind::StaticFetch,
                StrategyKind::PlatformTemplate,
                StrategyKind::GenericFallback,
            ]
        );
    }

    #[test]
    fn by_id_resolves_known_strategies() {
        let catalog = full_catalog();
        assert!(catalog.by_id("static-fetch").is_some());
        assert!(catalog.by_id("unknown-strategy").is_none());
    }
}
