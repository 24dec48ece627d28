//! Paced, sequential crawler over marketplace result pages.
//!
//! The crawler builds one search URL per result page and walks the
//! pagination in order, sleeping before every request. The marketplace
//! signals the end of a result set with HTTP 404; that is the only stop
//! condition besides transport failure.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};
use url::Url;

use garimpo_categories::UrlParts;
use garimpo_shared::{CrawlerConfig, GarimpoError, Result, SearchParams};

/// Listings per result page, fixed by the marketplace's pagination.
const PAGE_STRIDE: u64 = 50;

// ---------------------------------------------------------------------------
// ResultPage
// ---------------------------------------------------------------------------

/// One fetched result page, still unparsed.
#[derive(Debug, Clone)]
pub struct ResultPage {
    /// 1-based listing offset the page was requested at.
    pub offset: u64,
    /// Raw response body.
    pub html: String,
}

// ---------------------------------------------------------------------------
// PageCrawler
// ---------------------------------------------------------------------------

/// Sequential crawler for search result pagination.
pub struct PageCrawler {
    config: CrawlerConfig,
    client: Client,
}

impl PageCrawler {
    /// Create a new crawler with the given configuration.
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GarimpoError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Build the search URL for one result page.
    ///
    /// The marketplace encodes every filter in the path:
    /// `https://{subdomain}.mercadolivre.com.br/{suffix}{term}_Desde_{offset}`
    /// `_PriceRange_{min}-{max}{condition}`. With a `base_origin` override the
    /// subdomain folds into the path so one mock server can serve every host.
    pub fn search_url(&self, parts: &UrlParts, params: &SearchParams, offset: u64) -> Result<Url> {
        let origin = match &self.config.base_origin {
            Some(origin) => format!("{}/{}", origin.trim_end_matches('/'), parts.subdomain),
            None => format!("https://{}.mercadolivre.com.br", parts.subdomain),
        };
        let raw = format!(
            "{origin}/{suffix}{term}_Desde_{offset}_PriceRange_{min}-{max}{condition}",
            suffix = parts.suffix,
            term = urlencoding::encode(params.term.trim()),
            min = params.price_min,
            max = params.price_max,
            condition = params.condition.url_fragment(),
        );
        Url::parse(&raw).map_err(|e| GarimpoError::parse(format!("search url {raw:?}: {e}")))
    }

    /// Fetch every result page for `params`, in order and paced.
    ///
    /// Pages are requested at offsets `1, 1 + stride, 1 + 2 * stride, ...`
    /// where `stride` is `50 * (skip_pages + 1)`. Every request is preceded
    /// by the aggressiveness delay, the first one included. A 404 ends the
    /// walk; any other status is kept as a page so the extractors can decide
    /// what to do with the body. Transport failures end the walk early with
    /// whatever was already fetched.
    #[instrument(skip_all, fields(term = %params.term, category = %params.category))]
    pub async fn fetch_all_pages(
        &self,
        parts: &UrlParts,
        params: &SearchParams,
    ) -> Result<Vec<ResultPage>> {
        let stride = PAGE_STRIDE * (self.config.skip_pages + 1);
        let delay = params.aggressiveness.delay();
        let mut offset: u64 = 1;
        let mut pages: Vec<ResultPage> = Vec::new();

        info!(
            stride,
            delay_ms = delay.as_millis() as u64,
            "starting result crawl"
        );

        loop {
            tokio::time::sleep(delay).await;

            let url = self.search_url(parts, params, offset)?;
            debug!(%url, offset, "fetching result page");

            let response = match self.client.get(url.as_str()).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(%url, error = %e, "transport failure, ending crawl early");
                    break;
                }
            };

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                debug!(offset, "end of results");
                break;
            }

            let html = match response.text().await {
                Ok(html) => html,
                Err(e) => {
                    warn!(%url, error = %e, "failed to read body, ending crawl early");
                    break;
                }
            };

            if !status.is_success() {
                warn!(%status, offset, "keeping non-success page");
            }

            pages.push(ResultPage { offset, html });
            offset += stride;
        }

        info!(pages = pages.len(), "result crawl complete");
        Ok(pages)
    }
}
