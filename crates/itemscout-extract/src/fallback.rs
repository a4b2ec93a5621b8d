//! Last-resort strategy: scan every hyperlink that looks product-like and
//! pair it with a nearby price token. Intentionally low precision; the
//! catalog always orders this candidate last.

use std::collections::HashSet;
use std::sync::OnceLock;

use async_trait::async_trait;
use itemscout_core::{ExtractedRecord, Target};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;
use crate::fetch::fetch_html;
use crate::selectors::{collapse_whitespace, parse_price, resolve_url};
use crate::strategy::{Strategy, StrategyKind};

/// Hrefs must contain one of these to count as product-like.
const HREF_MARKERS: [&str; 5] = ["product", "item", "goods", "detail", "view"];

/// Cap on scanned records; beyond this the page is a link farm, not a
/// listing.
const MAX_RECORDS: usize = 100;

fn price_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // "12,900원", "9500 won", "$12.90" and bare 4+ digit runs
        Regex::new(r"(?:[$€£₩]\s*)?\d{1,3}(?:,\d{3})+|\d+\.\d{2}|\d{4,}")
            .unwrap_or_else(|_| unreachable!("price token pattern is valid"))
    })
}

pub struct GenericFallbackStrategy {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GenericFallbackStrategy {
    #[must_use]
    pub fn new(client: reqwest::Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout_secs,
        }
    }
}

#[async_trait]
impl Strategy for GenericFallbackStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GenericFallback
    }

    async fn execute(&self, target: &Target) -> Result<Vec<ExtractedRecord>, ExtractError> {
        let html = fetch_html(&self.client, &target.url, self.timeout_secs).await?;
        let records = scan_product_links(&html, &target.url);
        if records.is_empty() {
            return Err(ExtractError::Parse {
                url: target.url.clone(),
                reason: "no product-like links found".to_owned(),
            });
        }
        tracing::debug!(target = %target.id, records = records.len(), "fallback link scan");
        Ok(records)
    }
}

fn scan_product_links(html: &str, base_url: &str) -> Vec<ExtractedRecord> {
    let document = Html::parse_document(html);
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen_urls = HashSet::new();
    let mut records = Vec::new();

    for anchor in document.select(&anchor_selector) {
        if records.len() >= MAX_RECORDS {
            break;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.starts_with("javascript:") || href.starts_with("mailto:") || href.starts_with('#') {
            continue;
        }
        let lower = href.to_lowercase();
        if !HREF_MARKERS.iter().any(|m| lower.contains(m)) {
            continue;
        }

        let Some(url) = resolve_url(base_url, href) else {
            continue;
        };
        if !seen_urls.insert(url.clone()) {
            continue;
        }

        let name = anchor_name(anchor);
        if name.len() < 3 || name.len() > 200 {
            continue;
        }

        let image_url = anchor
            .select(&img_selector())
            .next()
            .and_then(|img| {
                img.value()
                    .attr("src")
                    .or_else(|| img.value().attr("data-src"))
            })
            .and_then(|src| resolve_url(base_url, src));

        let price = nearby_price(anchor);

        records.push(ExtractedRecord {
            name,
            price,
            url,
            image_url,
        });
    }

    records
}

fn img_selector() -> Selector {
    Selector::parse("img").unwrap_or_else(|_| unreachable!("static selector is valid"))
}

/// Name from the anchor text, falling back to the image alt/title.
fn anchor_name(anchor: ElementRef<'_>) -> String {
    let text = collapse_whitespace(&anchor.text().collect::<String>());
    if !text.is_empty() {
        return text;
    }
    anchor
        .select(&img_selector())
        .next()
        .and_then(|img| {
            img.value()
                .attr("alt")
                .or_else(|| img.value().attr("title"))
        })
        .map(collapse_whitespace)
        .unwrap_or_default()
}

/// Look for a price-like token in the anchor's parent element text.
fn nearby_price(anchor: ElementRef<'_>) -> Option<f64> {
    let parent = anchor.parent().and_then(ElementRef::wrap)?;
    let text = parent.text().collect::<String>();
    let token = price_token_regex().find(&text)?;
    parse_price(token.as_str())
}
