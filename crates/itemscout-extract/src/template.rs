//! Template-family strategy: probes the short list of listing paths used by
//! the storefront template this site family is built on, with selectors
//! tuned for that family's markup.

use async_trait::async_trait;
use itemscout_core::{ExtractedRecord, Target};

use crate::error::ExtractError;
use crate::fetch::{extract_origin, fetch_html};
use crate::selectors::{parse_listing_with, TEMPLATE_CONTAINERS};
use crate::strategy::{Strategy, StrategyKind};

/// Candidate listing paths under the site origin, probed in order.
const LISTING_PATHS: [&str; 5] = [
    "/product/list.html",
    "/shop/shopbrand.html",
    "/shop/goods/goods_list.php",
    "/goods/catalog",
    "/",
];

pub struct PlatformTemplateStrategy {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl PlatformTemplateStrategy {
    #[must_use]
    pub fn new(client: reqwest::Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout_secs,
        }
    }
}

#[async_trait]
impl Strategy for PlatformTemplateStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PlatformTemplate
    }

    async fn execute(&self, target: &Target) -> Result<Vec<ExtractedRecord>, ExtractError> {
        let origin = extract_origin(&target.url);
        let mut last_err: Option<ExtractError> = None;

        for listing_path in LISTING_PATHS {
            let url = format!("{origin}{listing_path}");
            let html = match fetch_html(&self.client, &url, self.timeout_secs).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::debug!(target = %target.id, url, error = %e, "listing path probe failed");
                    last_err = Some(e);
                    continue;
                }
            };

            let records = parse_listing_with(&html, &url, &TEMPLATE_CONTAINERS);
            if !records.is_empty() {
                tracing::debug!(
                    target = %target.id,
                    listing_path,
                    records = records.len(),
                    "template listing path matched"
                );
                return Ok(records);
            }
        }

        Err(last_err.unwrap_or_else(|| ExtractError::Parse {
            url: target.url.clone(),
            reason: "no template listing path yielded records".to_owned(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TEMPLATE_LISTING: &str = r#"<html><body>
        <ul class="goods_list">
          <li><a href="/shop/item.php?it_id=1"><img src="/data/1.jpg"></a>
              <span class="goods_name">Aged soy sauce 900ml</span>
              <span class="goods_price">14,000원</span></li>
          <li><a href="/shop/item.php?it_id=2"><img src="/data/2.jpg"></a>
              <span class="goods_name">Fermented bean paste</span>
              <span class="goods_price">11,000원</span></li>
        </ul></body></html>"#;

    fn target_for(server: &MockServer) -> Target {
        Target {
            id: "dolsan-mall".to_owned(),
            display_name: "Dolsan Mall".to_owned(),
            url: format!("{}/shop/main.php", server.uri()),
            platform_hint: None,
        }
    }

    fn strategy() -> PlatformTemplateStrategy {
        PlatformTemplateStrategy::new(reqwest::Client::new(), 30)
    }

    #[tokio::test]
    async fn probes_paths_until_listing_found() {
        let server = MockServer::start().await;
        // first two probes miss
        Mock::given(method("GET"))
            .and(path("/product/list.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shop/shopbrand.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shop/goods/goods_list.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TEMPLATE_LISTING))
            .mount(&server)
            .await;

        let records = strategy().execute(&target_for(&server)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Aged soy sauce 900ml");
        assert!(records[0].url.contains("/shop/item.php?it_id=1"));
    }

    #[tokio::test]
    async fn probes_from_origin_not_registry_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product/list.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TEMPLATE_LISTING))
            .mount(&server)
            .await;
        // anything else 404s
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let records = strategy().execute(&target_for(&server)).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn all_probes_missing_yields_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = strategy().execute(&target_for(&server)).await.unwrap_err();
        assert!(matches!(err, ExtractError::Parse { .. }), "got: {err:?}");
    }
}
