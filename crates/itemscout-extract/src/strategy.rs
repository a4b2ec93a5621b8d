use async_trait::async_trait;
use itemscout_core::{ExtractedRecord, PlatformHint, Target};

use crate::error::ExtractError;

/// Closed set of extraction techniques.
///
/// Selection is always a typed match on this enum; strategy ids exist only
/// for persistence and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    StaticFetch,
    RenderedFetch,
    PlatformTemplate,
    GenericFallback,
}

/// Global priority order for discovery. The generic fallback is last by
/// construction; [`crate::StrategyCatalog`] relies on that.
pub(crate) const PRIORITY_ORDER: [StrategyKind; 4] = [
    StrategyKind::StaticFetch,
    StrategyKind::PlatformTemplate,
    StrategyKind::RenderedFetch,
    StrategyKind::GenericFallback,
];

impl StrategyKind {
    /// Stable identifier used in the mapping store and attempt history.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::StaticFetch => "static-fetch",
            StrategyKind::RenderedFetch => "rendered-fetch",
            StrategyKind::PlatformTemplate => "platform-template",
            StrategyKind::GenericFallback => "generic-fallback",
        }
    }

    /// Inverse of [`StrategyKind::id`]; `None` for unknown ids (e.g. from a
    /// mapping file written by a newer version).
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "static-fetch" => Some(StrategyKind::StaticFetch),
            "rendered-fetch" => Some(StrategyKind::RenderedFetch),
            "platform-template" => Some(StrategyKind::PlatformTemplate),
            "generic-fallback" => Some(StrategyKind::GenericFallback),
            _ => None,
        }
    }

    /// The strategy a platform hint points at.
    #[must_use]
    pub fn for_hint(hint: PlatformHint) -> Self {
        match hint {
            PlatformHint::RenderedCommerce => StrategyKind::RenderedFetch,
            PlatformHint::TemplateFamily => StrategyKind::PlatformTemplate,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// One concrete extraction technique.
///
/// Implementations perform network I/O only; they never touch the mapping
/// store. A strategy's own timeout budget is enforced internally (via the
/// HTTP client for fetch-based strategies, around the drive phase for the
/// rendered one) so resource teardown always runs.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Extract a record set from the target's listing page.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::Network`]: DNS/connect failure or HTTP 5xx.
    /// - [`ExtractError::Timeout`]: the strategy's time budget ran out.
    /// - [`ExtractError::Parse`]: page fetched but no structural match.
    async fn execute(&self, target: &Target) -> Result<Vec<ExtractedRecord>, ExtractError>;
}
