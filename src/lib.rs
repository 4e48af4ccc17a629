// src/lib.rs
// =============================================================================
// valradar: crawl a website's footprint and search it for a pattern.
//
// Modules:
// - config: crawl settings and their defaults
// - error: the fatal errors of a crawl
// - fetch: the Fetcher trait and the default HTTP fetcher
// - crawl: worker pool, site map, HTML walker and crawl driver
// - scan: regex search over the finished site map
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod scan;

pub use config::CrawlConfig;
pub use crawl::{build_site_map, CrawlContext, SiteMap, WorkerPool};
pub use error::CrawlError;
