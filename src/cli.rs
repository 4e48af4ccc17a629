// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every crawl setting can also come from a JSON config file (--config).
// Flags given on the command line win over the file.
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct
// - Option<T>: "not given on the command line" is different from a default
// - TryFrom: turning parsed arguments into a validated config
// =============================================================================

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use valradar::CrawlConfig;

#[derive(Parser, Debug)]
#[command(
    name = "valradar",
    version,
    about = "Search for patterns and strings over a website's footprint",
    long_about = "valradar crawls a website to a bounded depth, fetches every page and script \
                  it links to, and reports each match of a regular expression with the URL \
                  it was found at."
)]
pub struct Cli {
    /// The website to scan (e.g., https://example.com)
    #[arg(short = 's', long = "site")]
    pub site: Option<String>,

    /// The regex pattern to try matching
    #[arg(short = 'p', long = "pattern")]
    pub pattern: String,

    /// How deep to search (0 = the start page only)
    #[arg(short = 'd', long = "depth")]
    pub depth: Option<usize>,

    /// How many crawl jobs may run at the same time
    #[arg(short = 'c', long = "concurrency")]
    pub concurrency: Option<usize>,

    /// JSON file with crawl settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// User agent sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output matches in JSON format
    #[arg(long)]
    pub json: bool,

    /// Log pool and fetch activity
    #[arg(long)]
    pub debug: bool,

    /// No logs at all
    #[arg(short, long, conflicts_with = "debug")]
    pub quiet: bool,
}

impl TryFrom<&Cli> for CrawlConfig {
    type Error = anyhow::Error;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let mut config = match &cli.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("unable to open config file {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => CrawlConfig::default(),
        };

        if let Some(site) = &cli.site {
            config.root_url = site.clone();
        }
        if let Some(depth) = cli.depth {
            config.max_depth = depth;
        }
        if let Some(concurrency) = cli.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(user_agent) = &cli.user_agent {
            config.fetch.user_agent = user_agent.clone();
        }
        if let Some(timeout) = cli.timeout {
            config.fetch.timeout_secs = timeout;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_build_config() {
        let cli = Cli::parse_from([
            "valradar", "-s", "https://x.test/", "-p", "secret", "-d", "3", "-c", "4",
        ]);
        let config = CrawlConfig::try_from(&cli).unwrap();

        assert_eq!(config.root_url, "https://x.test/");
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.concurrency, 4);
        assert_eq!(cli.pattern, "secret");
    }

    #[test]
    fn test_defaults_match_config_defaults() {
        let cli = Cli::parse_from(["valradar", "--site", "https://x.test/", "--pattern", "k"]);
        let config = CrawlConfig::try_from(&cli).unwrap();

        assert_eq!(config.max_depth, 1);
        assert_eq!(config.concurrency, 10);
        assert!(!cli.json);
    }

    #[test]
    fn test_flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("valradar-cli-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "rootUrl": "https://from-file.test/", "maxDepth": 4, "concurrency": 2 }"#)
            .unwrap();

        let cli = Cli::parse_from([
            "valradar".to_string(),
            "-p".to_string(),
            "x".to_string(),
            "-c".to_string(),
            "8".to_string(),
            "--config".to_string(),
            path.display().to_string(),
        ]);
        let config = CrawlConfig::try_from(&cli).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.root_url, "https://from-file.test/");
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.concurrency, 8);
    }

    #[test]
    fn test_pattern_is_required() {
        assert!(Cli::try_parse_from(["valradar", "-s", "https://x.test/"]).is_err());
    }
}
