use serde::{Deserialize, Serialize};

/// One item extracted from a target's listing page.
///
/// `price` is absent when the listing page shows no price or the price text
/// does not parse to a positive number. Many listing pages legitimately omit
/// prices, so absence here is not an extraction failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ExtractedRecord {
    /// A record is complete when it has a name and URL plus at least one of
    /// price or image URL.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && !self.url.is_empty()
            && (self.price.is_some() || self.image_url.is_some())
    }
}
