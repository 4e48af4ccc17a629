// src/fetch/http.rs
// =============================================================================
// The default fetcher: a plain HTTP GET through reqwest.
//
// Key functionality:
// - One shared client for every request (connection pooling)
// - Configurable timeout, user agent and redirect limit
// - Returns the body whatever the status code is
//
// Why keep bodies of 4xx/5xx responses?
// - We are searching content, not checking links
// - Error pages and debug pages are exactly where leaked values show up
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{FetchError, Fetcher};
use crate::config::FetchConfig;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds a fetcher from the crawl's fetch settings
    //
    // Fails only if the TLS backend can't be initialised
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

// The default fetch settings, or a bare client if those can't be built
impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(&FetchConfig::default()).unwrap_or_else(|e| {
            log::warn!("Falling back to a plain HTTP client: {}", e);
            Self {
                client: Client::new(),
            }
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("HTTP {} for {}, keeping the body anyway", status.as_u16(), url);
        }

        Ok(response.text().await?)
    }
}
