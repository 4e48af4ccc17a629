// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Values come from (lowest to highest priority):
// 1. Built-in defaults (the default_* functions below)
// 2. An optional JSON config file (--config)
// 3. Command-line flags
//
// Every field has a serde default, so a config file only needs the keys it
// wants to change.
// =============================================================================

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CrawlError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlConfig {
    /// The page the crawl starts from
    #[serde(default)]
    pub root_url: String,

    /// How many levels of pages get expanded (0 = root page only)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of jobs running at once in the worker pool
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub backpressure: Backpressure,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            max_depth: default_max_depth(),
            concurrency: default_concurrency(),
            fetch: FetchConfig::default(),
            backpressure: Backpressure::default(),
        }
    }
}

impl CrawlConfig {
    // Checks the settings that would make the crawl meaningless
    //
    // Returns the parsed root URL so callers don't parse it twice
    pub fn validate(&self) -> Result<Url, CrawlError> {
        if self.concurrency == 0 {
            return Err(CrawlError::ZeroConcurrency);
        }
        parse_root_url(&self.root_url)
    }
}

// Parses a crawl root, rejecting anything we can't resolve links against
pub fn parse_root_url(root_url: &str) -> Result<Url, CrawlError> {
    if root_url.trim().is_empty() {
        return Err(CrawlError::MissingRootUrl);
    }

    let url = Url::parse(root_url).map_err(|source| CrawlError::InvalidUrl {
        url: root_url.to_string(),
        source,
    })?;

    if url.host_str().is_none() {
        return Err(CrawlError::MissingHost(root_url.to_string()));
    }

    Ok(url)
}

// Settings for the default HTTP fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

// The pause taken before expanding another page when the pool is busy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backpressure {
    /// Delay kicks in when fewer slots than this are free
    #[serde(default = "default_min_free_slots")]
    pub min_free_slots: isize,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for Backpressure {
    fn default() -> Self {
        Self {
            min_free_slots: default_min_free_slots(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_max_depth() -> usize {
    1
}

fn default_concurrency() -> usize {
    10
}

fn default_user_agent() -> String {
    String::from(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36",
    )
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

fn default_min_free_slots() -> isize {
    2
}

fn default_delay_ms() -> u64 {
    500
}
