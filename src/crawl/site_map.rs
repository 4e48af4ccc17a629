// src/crawl/site_map.rs
// =============================================================================
// The resource store: every page and script the crawl has discovered.
//
// Rules:
// - One resource per URL, ever. The first insertion for a URL wins and later
//   ones are dropped without merging (dedup-by-first-write).
// - All access goes through a single lock, so worker tasks can record
//   resources concurrently.
// - The store also owns the fetcher used for the whole crawl.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use url::Url;

use crate::config::parse_root_url;
use crate::error::CrawlError;
use crate::fetch::{Fetcher, HttpFetcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// An HTML page, its links get crawled in turn
    Page,
    /// Script source, searched but never expanded
    Script,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebResource {
    pub url: String,
    pub content: String,
    pub kind: ResourceKind,
    /// True once this resource's own links have been expanded
    pub fetched: bool,
}

impl WebResource {
    // A freshly discovered page; its links are still to be expanded
    pub fn page(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            kind: ResourceKind::Page,
            fetched: false,
        }
    }

    // Scripts are leaves, so they start out as already expanded
    pub fn script(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            kind: ResourceKind::Script,
            fetched: true,
        }
    }

    pub fn is_page(&self) -> bool {
        self.kind == ResourceKind::Page
    }
}

pub struct SiteMap {
    root_url: Url,
    domain: String,
    resources: Mutex<HashMap<String, WebResource>>,
    fetcher: Arc<dyn Fetcher>,
}

impl SiteMap {
    // Creates an empty store for a crawl rooted at `root_url`
    //
    // Fails fast if the URL doesn't parse or has no host. Uses the HTTP fetcher
    // with default settings until `with_fetcher` says otherwise.
    pub fn new(root_url: &str) -> Result<Self, CrawlError> {
        let root_url = parse_root_url(root_url)?;
        let domain = root_url.host_str().unwrap_or_default().to_string();

        Ok(Self {
            root_url,
            domain,
            resources: Mutex::new(HashMap::new()),
            fetcher: Arc::new(HttpFetcher::default()),
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn fetcher(&self) -> Arc<dyn Fetcher> {
        self.fetcher.clone()
    }

    // Records a resource unless one already exists for its URL
    pub fn set_resource(&self, resource: WebResource) {
        let mut resources = self.resources.lock();
        if resources.contains_key(&resource.url) {
            log::trace!("Already mapped, dropping: {}", resource.url);
            return;
        }
        resources.insert(resource.url.clone(), resource);
    }

    // Flags a URL as expanded so it is never walked again
    //
    // A URL that isn't in the store yet is recorded as an empty page.
    pub fn mark_fetched(&self, url: &str) {
        let mut resources = self.resources.lock();
        resources
            .entry(url.to_string())
            .or_insert_with(|| WebResource::page(url, ""))
            .fetched = true;
    }

    pub fn is_fetched(&self, url: &str) -> bool {
        self.resources
            .lock()
            .get(url)
            .map(|r| r.fetched)
            .unwrap_or(false)
    }

    pub fn get(&self, url: &str) -> Option<WebResource> {
        self.resources.lock().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.resources.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A copy of every resource, sorted by URL
    pub fn resources(&self) -> Vec<WebResource> {
        let mut all: Vec<_> = self.resources.lock().values().cloned().collect();
        all.sort_by(|a, b| a.url.cmp(&b.url));
        all
    }
}
