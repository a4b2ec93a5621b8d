use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Coarse classification of a target site, derived from URL shape or set
/// explicitly in the registry file.
///
/// A hint only reorders strategy candidates; it never skips evaluation of the
/// extracted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformHint {
    /// Listing content arrives via client-side rendering; a headless session
    /// is the most likely strategy to work.
    RenderedCommerce,
    /// The site belongs to a known storefront family with predictable
    /// listing paths and markup.
    TemplateFamily,
}

impl std::fmt::Display for PlatformHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformHint::RenderedCommerce => write!(f, "rendered-commerce"),
            PlatformHint::TemplateFamily => write!(f, "template-family"),
        }
    }
}

impl PlatformHint {
    /// Best-effort hint from the URL alone, for registry entries that do not
    /// set one explicitly.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_lowercase();
        if lower.contains("smartstore.") {
            return Some(PlatformHint::RenderedCommerce);
        }
        if lower.contains("/shop/") || lower.contains("cafe24") {
            return Some(PlatformHint::TemplateFamily);
        }
        None
    }
}

/// One external site/listing to extract records from.
///
/// Immutable once loaded; owned by the registry file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_hint: Option<PlatformHint>,
}

impl Target {
    /// The platform hint from the registry, falling back to the URL-shape
    /// heuristic when none is configured.
    #[must_use]
    pub fn effective_hint(&self) -> Option<PlatformHint> {
        self.platform_hint.or_else(|| PlatformHint::from_url(&self.url))
    }
}

#[derive(Debug, Deserialize)]
pub struct TargetsFile {
    pub targets: Vec<Target>,
}

/// Load and validate the target registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (empty/duplicate ids, non-HTTP URLs).
pub fn load_targets(path: &Path) -> Result<TargetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TargetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let targets_file: TargetsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::TargetsFileParse)?;

    validate_targets(&targets_file)?;

    Ok(targets_file)
}

fn validate_targets(targets_file: &TargetsFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for target in &targets_file.targets {
        if target.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "target id must be non-empty".to_string(),
            ));
        }

        if target.display_name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "target '{}' has an empty display name",
                target.id
            )));
        }

        if !target.url.starts_with("http://") && !target.url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "target '{}' has non-HTTP url '{}'",
                target.id, target.url
            )));
        }

        if !seen_ids.insert(target.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate target id: '{}'",
                target.id
            )));
        }
    }

    Ok(())
}
