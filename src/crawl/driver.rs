// src/crawl/driver.rs
// =============================================================================
// This module drives the crawl: fetch a page, walk it, record what it links
// to, then go deeper into the linked pages.
//
// How it works:
// 1. Keep a stack of (url, depth) pairs, seeded with the start URL
// 2. Pop one; skip it if it's at the depth limit or was expanded already
// 3. Fetch it (or reuse the copy the store already holds) and walk it
// 4. Record the page and everything it links to in the site map
// 5. Push every linked page whose URL starts with "http" one level deeper
//
// Pages are expanded one at a time, depth-first. The parallelism lives one
// level down, in the walker's per-subtree jobs. When the pool is nearly
// full we pause before expanding the next page.
//
// Note: links are followed wherever they point. The crawl is NOT confined to
// the root's domain; the domain is only used to resolve relative links.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use super::pool::WorkerPool;
use super::site_map::{SiteMap, WebResource};
use super::walker::walk_page;
use crate::config::Backpressure;
use crate::error::CrawlError;
use crate::fetch::fetch_or_empty;

// Everything a crawl shares between pages
pub struct CrawlContext {
    pub pool: WorkerPool,
    pub site_map: Arc<SiteMap>,
    pub backpressure: Backpressure,
}

impl CrawlContext {
    pub fn new(pool: WorkerPool, site_map: Arc<SiteMap>) -> Self {
        Self {
            pool,
            site_map,
            backpressure: Backpressure::default(),
        }
    }

    pub fn with_backpressure(mut self, backpressure: Backpressure) -> Self {
        self.backpressure = backpressure;
        self
    }

    // Sleeps when the pool has fewer free slots than we'd like
    async fn throttle(&self) {
        let free = self.pool.available_slots();
        if free < self.backpressure.min_free_slots {
            log::debug!("Only {} free slot(s), backing off", free);
            tokio::time::sleep(Duration::from_millis(self.backpressure.delay_ms)).await;
        }
    }
}

// Maps everything reachable from `url` within `max_depth` levels
//
// `depth` is the level `url` sits at (0 for the crawl root). A URL at or
// beyond `max_depth` isn't expanded; when that's the seed itself, it is
// still fetched and recorded so the crawl has its root page.
//
// Only a failure to fetch the seed is an error. Every other fetch failure is
// logged and leaves an empty resource behind.
pub async fn build_site_map(
    ctx: &CrawlContext,
    url: &str,
    depth: usize,
    max_depth: usize,
) -> Result<(), CrawlError> {
    let site_map = &ctx.site_map;

    if site_map.is_fetched(url) {
        log::debug!("Already expanded: {}", url);
        return Ok(());
    }

    if depth >= max_depth {
        if site_map.get(url).is_none() {
            let body = fetch_seed(site_map, url).await?;
            site_map.set_resource(WebResource::page(url, body));
        }
        return Ok(());
    }

    let mut pending = vec![(url.to_string(), depth)];
    let mut is_seed = true;

    while let Some((page_url, page_depth)) = pending.pop() {
        if page_depth >= max_depth || site_map.is_fetched(&page_url) {
            continue;
        }

        let body = if is_seed {
            is_seed = false;
            fetch_seed(site_map, &page_url).await?
        } else {
            ctx.throttle().await;
            match site_map.get(&page_url) {
                Some(known) => known.content,
                None => fetch_or_empty(site_map.fetcher().as_ref(), &page_url).await,
            }
        };

        log::info!("Building: {} (depth {})", page_url, page_depth);
        let found = walk_page(&ctx.pool, site_map, &page_url, &body).await;
        log::debug!("{} resource(s) linked from {}", found.len(), page_url);

        site_map.set_resource(WebResource::page(page_url.as_str(), body));
        // Marked before its links are pushed, so a cycle back here stops
        site_map.mark_fetched(&page_url);

        // Reversed so the first link on the page is expanded first
        for resource in found.into_iter().rev() {
            let follow = resource.is_page() && resource.url.starts_with("http");
            let next = resource.url.clone();
            site_map.set_resource(resource);
            if follow {
                pending.push((next, page_depth + 1));
            }
        }
    }

    Ok(())
}

// The seed page has to be there, or there is nothing to crawl
async fn fetch_seed(site_map: &SiteMap, url: &str) -> Result<String, CrawlError> {
    log::info!("Fetching: {}", url);
    site_map
        .fetcher()
        .fetch(url)
        .await
        .map_err(|source| CrawlError::RootFetch {
            url: url.to_string(),
            source,
        })
}
