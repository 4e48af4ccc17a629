// src/crawl/mod.rs
// =============================================================================
// This module maps a website.
//
// Pieces, leaves first:
// - pool: bounded worker pool running the crawl's jobs
// - site_map: the thread-safe store of everything discovered
// - walker: pulls links out of a page and fetches them
// - driver: depth-limited crawl tying the three together
// =============================================================================

mod driver;
mod pool;
mod site_map;
mod walker;

pub use driver::{build_site_map, CrawlContext};
pub use pool::{CrawlJob, WorkerPool};
pub use site_map::{ResourceKind, SiteMap, WebResource};
