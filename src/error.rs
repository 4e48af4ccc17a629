// src/error.rs
// =============================================================================
// Errors that stop a crawl before (or right as) it starts.
//
// Per-resource fetch failures are NOT here: those are recovered inside the
// crawl by substituting empty content (see fetch::fetch_or_empty). Only
// configuration problems and an unreachable root page are fatal.
// =============================================================================

use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// No root URL was given on the command line or in the config file
    #[error("no site to crawl, pass --site or set rootUrl in the config file")]
    MissingRootUrl,

    #[error("unable to parse the url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The root URL parsed but has nothing to resolve links against
    #[error("url has no host: {0}")]
    MissingHost(String),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("unable to compile the regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Without the root page there is nothing to walk
    #[error("failed to fetch the root page {url}: {source}")]
    RootFetch {
        url: String,
        #[source]
        source: FetchError,
    },
}
