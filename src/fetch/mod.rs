// src/fetch/mod.rs
// =============================================================================
// This module turns a URL into textual content.
//
// The crawl never talks to the network directly. It goes through the
// `Fetcher` trait, so the plain HTTP fetcher can be swapped for anything that
// honours the same contract (a browser-rendered fetch, an in-memory site for
// tests, ...).
//
// Submodules:
// - http: the default reqwest-backed fetcher
// - memory: a canned-site fetcher used by the test suites
//
// Rust concepts:
// - Traits: `Fetcher` is the seam between the crawler and the network
// - async-trait: lets us keep `Arc<dyn Fetcher>` even though fetch is async
// =============================================================================

mod http;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpFetcher;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The fetcher has no content for this URL
    #[error("no content available for {0}")]
    Unavailable(String),
}

// The capability every content source implements.
//
// Implementations must be shareable across the worker pool's tasks, hence
// the Send + Sync bounds.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

// Fetches `url`, turning any failure into empty content.
//
// One broken resource must never abort a crawl: the failure is logged and an
// empty body is handed back, which can't match a pattern and has no links.
pub async fn fetch_or_empty(fetcher: &dyn Fetcher, url: &str) -> String {
    log::info!("Fetching: {}", url);
    match fetcher.fetch(url).await {
        Ok(content) => {
            log::debug!("Done: {} ({} bytes)", url, content.len());
            content
        }
        Err(e) => {
            log::warn!("Failed to fetch {}: {}", url, e);
            String::new()
        }
    }
}
