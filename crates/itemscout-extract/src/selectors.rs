//! Heuristic DOM queries shared by the fetch-based strategies.
//!
//! Selector sets are tried in order until one yields at least one element;
//! the sets cover the markup conventions observed across small storefronts
//! (`.product-item` grids, `.goods_list li` tables, bare `item.php` anchor
//! walls). Relative item/image URLs are always resolved against the page
//! base URL.

use itemscout_core::ExtractedRecord;
use scraper::{ElementRef, Html, Selector};

/// Container selectors for generic listing markup, most specific first.
pub(crate) const GENERIC_CONTAINERS: [&str; 8] = [
    ".product-item",
    ".goods-item",
    ".item",
    ".product_list li",
    ".goods_list li",
    "ul.products li",
    ".prd-item",
    ".prd_item",
];

/// Container selectors tuned for the template site family, including the
/// anchor-wall layout where each product is a bare `item.php` link.
pub(crate) const TEMPLATE_CONTAINERS: [&str; 6] = [
    ".goods_list li",
    ".item_list li",
    ".product_list li",
    ".list_v li",
    ".item-list .item",
    "a[href*='item.php']",
];

const NAME_SELECTORS: &str =
    ".product-name, .goods-name, .goods_name, .item_name, .prd_name, .name, .title";
const PRICE_SELECTORS: &str =
    ".price, .product-price, .goods_price, .item_price, .prd_price, .cost";

/// Parse a listing page with the generic selector sets.
pub(crate) fn parse_listing(html: &str, base_url: &str) -> Vec<ExtractedRecord> {
    parse_listing_with(html, base_url, &GENERIC_CONTAINERS)
}

/// Parse a listing page, trying `containers` in order until one produces at
/// least one record.
pub(crate) fn parse_listing_with(
    html: &str,
    base_url: &str,
    containers: &[&str],
) -> Vec<ExtractedRecord> {
    let document = Html::parse_document(html);

    for container in containers {
        let Ok(selector) = Selector::parse(container) else {
            continue;
        };

        let mut records = Vec::new();
        for element in document.select(&selector) {
            if let Some(record) = record_from_element(element, base_url) {
                records.push(record);
            }
        }
        if !records.is_empty() {
            return records;
        }
    }

    Vec::new()
}

/// Count visible listing items without building records, for the rendered
/// strategy's scroll loop.
pub(crate) fn count_listing_items(html: &str) -> usize {
    let document = Html::parse_document(html);

    for container in GENERIC_CONTAINERS.iter().chain(TEMPLATE_CONTAINERS.iter()) {
        let Ok(selector) = Selector::parse(container) else {
            continue;
        };
        let count = document.select(&selector).count();
        if count > 0 {
            return count;
        }
    }
    0
}

/// Build a record from one container element.
///
/// Anchor containers (the `item.php` wall) are their own link; the name then
/// comes from the image alt/title or the anchor text.
fn record_from_element(element: ElementRef<'_>, base_url: &str) -> Option<ExtractedRecord> {
    let is_anchor = element.value().name() == "a";

    let href = if is_anchor {
        element.value().attr("href").map(ToOwned::to_owned)
    } else {
        first_match(element, "a").and_then(|a| a.value().attr("href").map(ToOwned::to_owned))
    }?;
    if href.starts_with("javascript:") || href.starts_with("mailto:") {
        return None;
    }
    let url = resolve_url(base_url, &href)?;

    let image = first_match(element, "img");
    let image_url = image
        .and_then(|img| {
            img.value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
        })
        .and_then(|src| resolve_url(base_url, src));

    let name = if is_anchor {
        image
            .and_then(|img| {
                img.value()
                    .attr("alt")
                    .or_else(|| img.value().attr("title"))
            })
            .map(str::to_owned)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| collapse_whitespace(&element.text().collect::<String>()))
    } else {
        first_match(element, NAME_SELECTORS)
            .map(|n| collapse_whitespace(&n.text().collect::<String>()))
            .unwrap_or_default()
    };
    let name = collapse_whitespace(&name);
    if name.len() < 2 || name.len() > 200 {
        return None;
    }

    let price = first_match(element, PRICE_SELECTORS)
        .and_then(|p| parse_price(&p.text().collect::<String>()));

    Some(ExtractedRecord {
        name,
        price,
        url,
        image_url,
    })
}

fn first_match<'a>(element: ElementRef<'a>, selectors: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selectors).ok()?;
    element.select(&selector).next()
}

/// Resolve a possibly-relative href against the page base URL.
pub(crate) fn resolve_url(base_url: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_owned());
    }
    let base = reqwest::Url::parse(base_url).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Parse a price-like token ("12,900원", "$12.90") to a positive number.
///
/// Zero is treated as missing: listing templates render an empty price cell
/// as "0" for items whose price only appears on the detail page.
pub(crate) fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value = cleaned.parse::<f64>().ok()?;
    if value > 0.0 {
        Some(value)
    } else {
        None
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
