//! Sumi-Crawl main entry point
//!
//! This is the command-line interface for the Sumi-Crawl URL discovery engine.

use clap::Parser;
use std::path::PathBuf;
use sumi_crawl::config::{load_config_with_hash, Config};
use sumi_crawl::crawler::crawl;
use tracing_subscriber::EnvFilter;

/// Sumi-Crawl: A polite URL discovery crawler
///
/// Sumi-Crawl discovers URLs breadth-first from a set of seeds while respecting
/// robots.txt permissions, crawl delays and a global request budget. The
/// discovered URLs are printed to stdout, one per line.
#[derive(Parser, Debug)]
#[command(name = "sumi-crawl")]
#[command(version = "1.0.0")]
#[command(about = "A polite URL discovery crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout only carries discovered URLs.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_crawl=info,warn"),
            1 => EnvFilter::new("sumi_crawl=debug,info"),
            2 => EnvFilter::new("sumi_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    match config.crawler.limit {
        Some(limit) if limit > 0 => println!("  Limit: {} {}", limit, config.crawler.target),
        _ => println!("  Limit: none"),
    }
    println!("  Internal only: {}", config.crawler.internal_only);
    match config.crawler.timeout_secs {
        Some(secs) => println!("  Timeout: {}s", secs),
        None => println!("  Timeout: none"),
    }
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );

    println!("\nPoliteness:");
    println!("  Respect robots.txt: {}", config.politeness.respect_robots);
    println!("  Request delay: {}ms", config.politeness.request_delay_ms);
    match config.politeness.robots_cache_ttl_secs {
        Some(ttl) => println!("  Robots.txt cache TTL: {}s", ttl),
        None => println!("  Robots.txt cache: disabled"),
    }

    println!("\nSitemaps:");
    println!("  Enabled: {}", config.sitemap.enabled);
    println!("  Known paths: {}", config.sitemap.use_known_paths);
    println!("  Max depth: {}", config.sitemap.max_depth);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Total seed URLs: {}", config.crawler.seeds.len());

    let discovered = match crawl(config).await {
        Ok(discovered) => {
            tracing::info!("Crawl completed: {} URLs discovered", discovered.len());
            discovered
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let mut urls: Vec<String> = discovered.into_iter().collect();
    urls.sort();
    for url in urls {
        println!("{}", url);
    }

    Ok(())
}
