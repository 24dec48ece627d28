//! Seller reputation verification.
//!
//! For each listing the verifier fetches the detail page and reads the
//! seller thermometer. Every failure mode folds into a boolean verdict: a
//! seller that cannot be verified is simply not reputable.

use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tracing::{debug, instrument, warn};

use garimpo_extract::{ThermometerReading, is_aggregated_listing, read_thermometer};
use garimpo_shared::{Aggressiveness, CrawlerConfig, GarimpoError, MinReputation, Result};

// ---------------------------------------------------------------------------
// ReputationPolicy
// ---------------------------------------------------------------------------

/// How to treat detail pages the thermometer cannot be read from.
#[derive(Debug, Clone)]
pub struct ReputationPolicy {
    /// Trust multi-seller catalog listings that carry no thermometer.
    /// The marketplace gates which sellers enter those pools.
    pub trust_aggregated_listings: bool,
}

impl Default for ReputationPolicy {
    fn default() -> Self {
        Self {
            trust_aggregated_listings: true,
        }
    }
}

// ---------------------------------------------------------------------------
// ReputationVerifier
// ---------------------------------------------------------------------------

/// Verifies sellers against a minimum reputation bar, one detail page at a
/// time, paced like the page crawler.
pub struct ReputationVerifier {
    client: Client,
    delay: Duration,
    policy: ReputationPolicy,
}

impl ReputationVerifier {
    /// Create a verifier with the default policy.
    pub fn new(config: &CrawlerConfig, aggressiveness: Aggressiveness) -> Result<Self> {
        Self::with_policy(config, aggressiveness, ReputationPolicy::default())
    }

    /// Create a verifier with an explicit policy.
    pub fn with_policy(
        config: &CrawlerConfig,
        aggressiveness: Aggressiveness,
        policy: ReputationPolicy,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GarimpoError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            delay: aggressiveness.delay(),
            policy,
        })
    }

    /// Decide whether the seller behind `link` clears `min_rep`.
    ///
    /// A bar of zero passes without any network activity. An empty link, an
    /// unreachable page, and a missing thermometer all read as not
    /// reputable. A thermometer with no tier yet passes: the seller has no
    /// record against them.
    #[instrument(skip_all, fields(link = %link, min_rep = min_rep.level()))]
    pub async fn verify(&self, link: &str, min_rep: MinReputation) -> bool {
        if min_rep.is_off() {
            return true;
        }
        if link.is_empty() {
            return false;
        }

        tokio::time::sleep(self.delay).await;

        let body = match self.fetch_detail_page(link).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "detail page unreachable, seller not verifiable");
                return false;
            }
        };
        let page = Html::parse_document(&body);

        if self.policy.trust_aggregated_listings && is_aggregated_listing(&page) {
            debug!("aggregated listing, trusted by policy");
            return true;
        }

        match read_thermometer(&page) {
            ThermometerReading::Missing => false,
            ThermometerReading::Unrated => true,
            ThermometerReading::Tier(tier) => tier.rank() >= min_rep.level(),
        }
    }

    async fn fetch_detail_page(&self, link: &str) -> Result<String> {
        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(|e| GarimpoError::Network(format!("{link}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GarimpoError::Network(format!("{link}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| GarimpoError::Network(format!("{link}: {e}")))
    }
}
