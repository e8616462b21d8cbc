//! Page retrieval.
//!
//! [`PageFetcher`] abstracts how markup is obtained so the cycle can be
//! driven by canned pages in tests. [`HttpFetcher`] is the production
//! implementation: a static `reqwest` GET with a browser user agent.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::adapter::{PageSource, PageUrls};
use crate::error::TrackerError;

/// User agent sent with every request; some resort sites reject bots.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Source of page markup.
#[async_trait]
pub trait PageFetcher: Send + Sync + fmt::Debug {
    /// Returns the body of `url`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Fetch`] on network or HTTP status failure.
    async fn fetch(&self, url: &str) -> Result<String, TrackerError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Fetch`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, TrackerError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        tracing::debug!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}

/// Fetches every page an adapter declared.
///
/// The terrain page is mandatory. A failed conditions page only costs
/// the snow and report fields, so it is logged and left out.
///
/// # Errors
///
/// Returns the terrain page's fetch error.
pub async fn fetch_pages(
    fetcher: &dyn PageFetcher,
    urls: &PageUrls,
) -> Result<PageSource, TrackerError> {
    let terrain = fetcher.fetch(urls.terrain).await?;
    let mut page = PageSource::new(terrain);
    if let Some(conditions_url) = urls.conditions {
        match fetcher.fetch(conditions_url).await {
            Ok(body) => page = page.with_conditions(body),
            Err(e) => {
                tracing::warn!(url = conditions_url, error = %e, "conditions page unavailable");
            }
        }
    }
    Ok(page)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Debug, Default)]
    struct CannedFetcher {
        pages: HashMap<&'static str, &'static str>,
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<String, TrackerError> {
            self.pages
                .get(url)
                .map(|body| (*body).to_string())
                .ok_or_else(|| TrackerError::Fetch(format!("404 {url}")))
        }
    }

    #[tokio::test]
    async fn fetches_both_pages() {
        let fetcher = CannedFetcher {
            pages: HashMap::from([("t", "terrain"), ("c", "conditions")]),
        };
        let urls = PageUrls {
            terrain: "t",
            conditions: Some("c"),
        };
        let Ok(page) = fetch_pages(&fetcher, &urls).await else {
            panic!("both pages exist");
        };
        assert_eq!(page.terrain_html(), "terrain");
        assert_eq!(page.conditions_html(), Some("conditions"));
    }

    #[tokio::test]
    async fn missing_conditions_page_is_tolerated() {
        let fetcher = CannedFetcher {
            pages: HashMap::from([("t", "terrain")]),
        };
        let urls = PageUrls {
            terrain: "t",
            conditions: Some("c"),
        };
        let page = fetch_pages(&fetcher, &urls).await;
        tokio_test::assert_ok!(&page);
        assert_eq!(page.ok().and_then(|p| p.conditions_html().map(str::to_string)), None);
    }

    #[tokio::test]
    async fn missing_terrain_page_fails() {
        let fetcher = CannedFetcher::default();
        let result = fetch_pages(&fetcher, &PageUrls::single("t")).await;
        assert!(matches!(result, Err(TrackerError::Fetch(_))));
    }

    #[test]
    fn http_fetcher_builds() {
        tokio_test::assert_ok!(HttpFetcher::new(Duration::from_secs(5)));
    }
}
