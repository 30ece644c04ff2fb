// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commerce platform admin-API client.
//!
//! Paginates resource listings via `Link: <...>; rel="next"` headers with a
//! bounded page size, a per-request timeout, and a bounded retry for
//! transient transport failures. Everything else surfaces as
//! `ParlorError::Upstream`.

use parlor_core::ParlorError;
use serde_json::Value;
use tracing::{debug, warn};

/// Client settings.
///
/// Mirrors `CommerceConfig` from `parlor-config` so this crate does not
/// depend on the config crate.
#[derive(Debug, Clone)]
pub struct CommerceSettings {
    /// Admin API version segment.
    pub api_version: String,
    /// Page size for listings (1..=250).
    pub page_size: u32,
    /// Per-request timeout.
    pub request_timeout: std::time::Duration,
    /// Retry attempts for transient transport failures.
    pub max_retries: u32,
    /// Scheme+host override used in tests; `None` targets `https://<shop>`.
    pub base_url_override: Option<String>,
}

impl Default for CommerceSettings {
    fn default() -> Self {
        Self {
            api_version: "2023-10".to_string(),
            page_size: 250,
            request_timeout: std::time::Duration::from_secs(10),
            max_retries: 2,
            base_url_override: None,
        }
    }
}

/// HTTP client for the commerce admin API.
#[derive(Debug, Clone)]
pub struct CommerceClient {
    http: reqwest::Client,
    settings: CommerceSettings,
}

impl CommerceClient {
    /// Build a client with the configured timeout baked in.
    pub fn new(settings: CommerceSettings) -> Result<Self, ParlorError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ParlorError::Upstream {
                message: format!("failed to build commerce client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { http, settings })
    }

    fn first_page_url(&self, shop: &str, resource: &str) -> String {
        let base = match &self.settings.base_url_override {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{shop}"),
        };
        format!(
            "{base}/admin/api/{version}/{resource}.json?limit={limit}",
            version = self.settings.api_version,
            limit = self.settings.page_size,
        )
    }

    /// Fetch every record of `resource` for `shop`, following pagination.
    ///
    /// `resource` is the API path segment and also the JSON key wrapping the
    /// record array (`products`, `custom_collections`, `pages`).
    pub async fn fetch_all(
        &self,
        shop: &str,
        access_token: &str,
        resource: &str,
    ) -> Result<Vec<Value>, ParlorError> {
        let mut records = Vec::new();
        let mut url = self.first_page_url(shop, resource);

        loop {
            let response = self.get_with_retry(&url, access_token).await?;

            let next = response
                .headers()
                .get("link")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_next_link);

            let status = response.status();
            if !status.is_success() {
                return Err(ParlorError::Upstream {
                    message: format!("failed to fetch {resource}: {status}"),
                    source: None,
                });
            }

            let body: Value = response.json().await.map_err(|e| ParlorError::Upstream {
                message: format!("malformed {resource} response: {e}"),
                source: Some(Box::new(e)),
            })?;

            let page = body
                .get(resource)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            debug!(resource, page_len = page.len(), "fetched commerce page");
            records.extend(page);

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        Ok(records)
    }

    /// One GET with bounded retries for transient transport failures
    /// (timeouts, connection resets). HTTP error statuses are not retried.
    async fn get_with_retry(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<reqwest::Response, ParlorError> {
        let mut attempt = 0;
        loop {
            let result = self
                .http
                .get(url)
                .header("X-Shopify-Access-Token", access_token)
                .header("Content-Type", "application/json")
                .send()
                .await;

            match result {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.settings.max_retries && is_transient(&e) => {
                    attempt += 1;
                    warn!(url, attempt, error = %e, "transient commerce failure, retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(
                        200 * u64::from(attempt),
                    ))
                    .await;
                }
                Err(e) if e.is_timeout() => {
                    return Err(ParlorError::Timeout {
                        duration: self.settings.request_timeout,
                    });
                }
                Err(e) => {
                    return Err(ParlorError::Upstream {
                        message: format!("commerce request failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                }
            }
        }
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}

/// Extract the `rel="next"` URL from a Link header, if present.
fn parse_next_link(header: &str) -> Option<String> {
    for part in header.split(',') {
        let part = part.trim();
        if !part.contains("rel=\"next\"") {
            continue;
        }
        let start = part.find('<')? + 1;
        let end = part.find('>')?;
        if start < end {
            return Some(part[start..end].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base: &str) -> CommerceClient {
        CommerceClient::new(CommerceSettings {
            page_size: 2,
            base_url_override: Some(base.to_string()),
            ..CommerceSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn parse_next_link_finds_next_rel() {
        let header = "<https://x.example/admin/api/2023-10/products.json?page_info=abc>; rel=\"next\"";
        assert_eq!(
            parse_next_link(header).as_deref(),
            Some("https://x.example/admin/api/2023-10/products.json?page_info=abc")
        );
    }

    #[test]
    fn parse_next_link_skips_previous_rel() {
        let header = "<https://x.example/a>; rel=\"previous\", <https://x.example/b>; rel=\"next\"";
        assert_eq!(parse_next_link(header).as_deref(), Some("https://x.example/b"));
        assert_eq!(parse_next_link("<https://x.example/a>; rel=\"previous\""), None);
    }

    #[tokio::test]
    async fn fetch_all_reads_a_single_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2023-10/products.json"))
            .and(query_param("limit", "2"))
            .and(header("X-Shopify-Access-Token", "shpat_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "products": [{"id": 1, "title": "Mug"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let records = client
            .fetch_all("acme.myshopify.com", "shpat_test", "products")
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "Mug");
    }

    #[tokio::test]
    async fn fetch_all_follows_link_pagination() {
        let server = MockServer::start().await;
        let next_url = format!(
            "{}/admin/api/2023-10/products.json?limit=2&page_info=cursor2",
            server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/admin/api/2023-10/products.json"))
            .and(query_param("page_info", "cursor2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "products": [{"id": 3, "title": "Scarf"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2023-10/products.json"))
            .and(query_param("limit", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Link", format!("<{next_url}>; rel=\"next\"").as_str())
                    .set_body_json(serde_json::json!({
                        "products": [{"id": 1, "title": "Mug"}, {"id": 2, "title": "Cap"}]
                    })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let records = client
            .fetch_all("acme.myshopify.com", "shpat_test", "products")
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2023-10/custom_collections.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .fetch_all("acme.myshopify.com", "shpat_test", "custom_collections")
            .await
            .unwrap_err();
        assert!(matches!(err, ParlorError::Upstream { .. }));
        assert!(err.to_string().contains("custom_collections"));
    }

    #[tokio::test]
    async fn missing_resource_key_reads_as_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2023-10/pages.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let records = client
            .fetch_all("acme.myshopify.com", "shpat_test", "pages")
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}
