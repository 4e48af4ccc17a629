// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments and build the crawl config
// 2. Compile the pattern and validate the root URL (fail before crawling)
// 3. Crawl the site into a site map
// 4. Search every crawled resource and print the matches
// 5. Exit with proper code (0 = matches found, 1 = no match, 2 = error)
// =============================================================================

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use valradar::fetch::HttpFetcher;
use valradar::scan::{self, PatternMatch};
use valradar::{build_site_map, CrawlConfig, CrawlContext, SiteMap, WorkerPool};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = CrawlConfig::try_from(&cli)?;
    let pattern = scan::compile_pattern(&cli.pattern)?;
    let root_url = config.validate()?;

    let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
    let site_map = Arc::new(SiteMap::new(root_url.as_str())?.with_fetcher(fetcher));
    let pool = WorkerPool::new(config.concurrency);
    log::debug!("Worker pool with {} slot(s)", pool.max_concurrency());
    let ctx = CrawlContext::new(pool, site_map).with_backpressure(config.backpressure);

    if !cli.json {
        println!("🕸️  Mapping {} (depth {})", root_url, config.max_depth);
    }

    build_site_map(&ctx, root_url.as_str(), 0, config.max_depth).await?;
    ctx.pool.wait().await;

    if !cli.json {
        println!("🕸️  Built map of {} ({} resource(s))", root_url, ctx.site_map.len());
    }

    let matches = scan::find_matches(&ctx.site_map, &pattern);
    print_results(&matches, &cli)?;

    if matches.is_empty() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// RUST_LOG wins; otherwise --debug/--quiet pick the level
fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "off"
    } else if cli.debug {
        "valradar=debug"
    } else {
        "warn"
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .init();
}

fn print_results(matches: &[PatternMatch], cli: &Cli) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No matches found for {}", cli.pattern);
        return Ok(());
    }

    for m in matches {
        println!("🔎 Found {} at the url {}", m.matched, m.url);
    }
    println!("\n📊 {} match(es)", matches.len());

    Ok(())
}
