// src/scan.rs
// =============================================================================
// This module searches the crawled content for a regex pattern.
//
// It runs strictly after the crawl is over: every resource in the site map is
// scanned and each match is reported together with the URL it came from.
// =============================================================================

use regex::Regex;
use serde::Serialize;

use crate::crawl::SiteMap;
use crate::error::CrawlError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternMatch {
    /// The resource the match was found in
    pub url: String,
    /// The matched text
    pub matched: String,
    /// Byte offset of the match inside the resource's content
    pub offset: usize,
}

// Compiles the user's pattern before any crawling starts
pub fn compile_pattern(pattern: &str) -> Result<Regex, CrawlError> {
    Ok(Regex::new(pattern)?)
}

// Every non-overlapping match in every resource, ordered by URL then offset
pub fn find_matches(site_map: &SiteMap, pattern: &Regex) -> Vec<PatternMatch> {
    site_map
        .resources()
        .iter()
        .flat_map(|resource| {
            pattern.find_iter(&resource.content).map(move |m| PatternMatch {
                url: resource.url.clone(),
                matched: m.as_str().to_string(),
                offset: m.start(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::WebResource;

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(matches!(compile_pattern("(unclosed"), Err(CrawlError::InvalidPattern(_))));
    }

    #[test]
    fn test_find_matches_across_resources() {
        let site_map = SiteMap::new("https://a.com/").unwrap();
        site_map.set_resource(WebResource::page("https://a.com/b", "key=AKIA1 and key=AKIA2"));
        site_map.set_resource(WebResource::script("https://a.com/a.js", "const k = 'AKIA3';"));
        site_map.set_resource(WebResource::page("https://a.com/empty", ""));

        let pattern = compile_pattern(r"AKIA\d").unwrap();
        let matches = find_matches(&site_map, &pattern);

        let found: Vec<_> = matches
            .iter()
            .map(|m| (m.url.as_str(), m.matched.as_str(), m.offset))
            .collect();
        assert_eq!(
            found,
            vec![
                ("https://a.com/a.js", "AKIA3", 11),
                ("https://a.com/b", "AKIA1", 4),
                ("https://a.com/b", "AKIA2", 18),
            ]
        );
    }

    #[test]
    fn test_no_matches() {
        let site_map = SiteMap::new("https://a.com/").unwrap();
        site_map.set_resource(WebResource::page("https://a.com/", "nothing here"));
        let pattern = compile_pattern("secret").unwrap();
        assert!(find_matches(&site_map, &pattern).is_empty());
    }
}
