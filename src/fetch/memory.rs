// src/fetch/memory.rs
// =============================================================================
// An in-memory fetcher serving a fixed set of pages.
//
// Every request is recorded, so tests can assert not only what was found but
// also what was (or was never) fetched.
// =============================================================================

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{FetchError, Fetcher};

#[derive(Debug, Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    // Makes every fetch take a while, to keep jobs in flight during tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Unavailable(url.to_string()))
    }
}
