pub mod browser;
pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod fallback;
mod fetch;
pub mod rendered;
mod selectors;
pub mod static_fetch;
pub mod strategy;
pub mod template;

pub use browser::{BrowserEngine, BrowserPage};
pub use catalog::StrategyCatalog;
pub use error::ExtractError;
pub use evaluator::{QualityPolicy, Verdict};
pub use strategy::{Strategy, StrategyKind};
