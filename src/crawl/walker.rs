// src/crawl/walker.rs
// =============================================================================
// This module walks a parsed HTML page and turns its links into resources.
//
// How it works:
// 1. Parse the page with `scraper` (html5ever never rejects input)
// 2. For every element child of <html> (usually <head> and <body>), collect
//    the href of each <a>/<link> and the src of each <script>, depth-first
// 3. Start one worker pool job per child subtree; each job normalizes its
//    links, fetches them and records the results
// 4. Wait for the pool, then hand back everything that was found
//
// Which links are followed:
//   "/about"        -> scheme://host/about   (site-root relative)
//   "//cdn.x/a.js"  -> scheme://cdn.x/a.js   (protocol relative)
//   "#top"          -> skipped               (fragment only)
//   "https://..."   -> skipped               (already absolute)
//   anything else   -> skipped (relative paths, mailto:, javascript:, ...)
//
// Rust concepts:
// - Recursion over a borrowed tree (ElementRef<'a>)
// - Arc<Mutex<...>>: results shared between the jobs of one page
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use scraper::{ElementRef, Html};
use url::Url;

use super::pool::{CrawlJob, WorkerPool};
use super::site_map::{SiteMap, WebResource};
use crate::fetch::fetch_or_empty;

// A raw attribute value pulled out of the document, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRef {
    /// href of an <a> or <link>, becomes a page
    Href(String),
    /// src of a <script>, becomes a script
    Src(String),
}

// What relative links on a page resolve against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrigin {
    scheme: String,
    /// Host, plus the port when it isn't the scheme's default
    authority: String,
}

impl PageOrigin {
    pub fn of(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Some(Self {
            scheme: url.scheme().to_string(),
            authority,
        })
    }

    // The origin of `page_url`, or of the crawl root if the page URL is odd
    fn for_page(page_url: &str, site_map: &SiteMap) -> Self {
        Url::parse(page_url)
            .ok()
            .and_then(|url| Self::of(&url))
            .unwrap_or_else(|| Self {
                scheme: site_map.root_url().scheme().to_string(),
                authority: site_map.domain().to_string(),
            })
    }
}

// Turns a raw link into a fetchable URL, or None if it shouldn't be followed
pub fn normalize_link(link: &LinkRef, origin: &PageOrigin) -> Option<String> {
    match link {
        LinkRef::Href(href) => {
            let href = href.trim();
            // A bare "/" or "#" carries nothing worth fetching
            if href.len() <= 1 {
                return None;
            }
            rewrite(href, origin)
        }
        LinkRef::Src(src) => rewrite(src.trim(), origin),
    }
}

// Only root-relative and protocol-relative values are rewritten
fn rewrite(value: &str, origin: &PageOrigin) -> Option<String> {
    if value.starts_with("//") {
        Some(format!("{}:{}", origin.scheme, value))
    } else if value.starts_with('/') {
        Some(format!("{}://{}{}", origin.scheme, origin.authority, value))
    } else {
        None
    }
}

// Parses a page and collects the links of each top-level subtree
//
// Returns one list per element child of the root element, each in document
// order. Everything is owned, the parsed DOM doesn't outlive this call.
pub fn collect_subtrees(html: &str) -> Vec<Vec<LinkRef>> {
    let document = Html::parse_document(html);

    document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .map(|child| {
            let mut links = Vec::new();
            collect_links(child, &mut links);
            links
        })
        .collect()
}

// Depth-first: the element itself, then each of its children
fn collect_links(element: ElementRef<'_>, links: &mut Vec<LinkRef>) {
    let value = element.value();
    match value.name() {
        "a" | "link" => {
            if let Some(href) = value.attr("href") {
                links.push(LinkRef::Href(href.to_string()));
            }
        }
        "script" => {
            if let Some(src) = value.attr("src") {
                links.push(LinkRef::Src(src.to_string()));
            }
        }
        _ => {}
    }

    for child in element.children().filter_map(ElementRef::wrap) {
        collect_links(child, links);
    }
}

// Walks one page and returns the resources its links point to
//
// Each top-level subtree is a separate pool job, and this blocks until all
// of them are done. Fetch failures become empty content. A URL already in
// the store is not fetched again; its stored copy is returned instead so the
// caller can still decide to expand it from here.
pub async fn walk_page(
    pool: &WorkerPool,
    site_map: &Arc<SiteMap>,
    page_url: &str,
    body: &str,
) -> Vec<WebResource> {
    let origin = PageOrigin::for_page(page_url, site_map);
    let subtrees = collect_subtrees(body);

    let found = Arc::new(Mutex::new(Vec::new()));
    // URLs some job of this page already took care of
    let claimed = Arc::new(Mutex::new(HashSet::new()));

    for (index, links) in subtrees.into_iter().enumerate() {
        let origin = origin.clone();
        let site_map = site_map.clone();
        let found = found.clone();
        let claimed = claimed.clone();

        let label = format!("{} [subtree {}]", page_url, index);
        pool.start(CrawlJob::new(label, async move {
            let fetcher = site_map.fetcher();
            let mut local = Vec::new();

            for link in links {
                let Some(url) = normalize_link(&link, &origin) else {
                    continue;
                };
                if !claimed.lock().insert(url.clone()) {
                    continue;
                }

                let resource = match site_map.get(&url) {
                    Some(existing) => existing,
                    None => {
                        let content = fetch_or_empty(fetcher.as_ref(), &url).await;
                        match link {
                            LinkRef::Href(_) => WebResource::page(url, content),
                            LinkRef::Src(_) => WebResource::script(url, content),
                        }
                    }
                };
                local.push(resource);
            }

            found.lock().extend(local);
        }));
    }

    pool.wait().await;

    let resources = std::mem::take(&mut *found.lock());
    resources
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why collect links before spawning jobs?
//    - scraper's Html keeps its strings in a type that can't cross threads
//    - Jobs run on any worker thread, so they only get owned Strings
//
// 2. What is ElementRef::wrap?
//    - The DOM has text, comment and element nodes
//    - wrap() returns Some only for elements, which is all we care about
//
// 3. Why `let Some(url) = ... else { continue; }`?
//    - let-else binds the value or runs the else branch, which must leave
//      the current block (here: skip to the next link)
// -----------------------------------------------------------------------------
