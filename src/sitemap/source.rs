//! Sitemap retrieval
//!
//! Sitemaps are discovered through `Sitemap:` directives in robots.txt and,
//! optionally, a list of well-known locations. Sitemap indexes are followed up
//! to a depth bound and gzip-compressed sitemaps are decompressed.

use crate::robots::ParsedRobots;
use crate::sitemap::{SitemapPage, SitemapTree};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{header::CONTENT_TYPE, Client};
use sitemap::reader::{SiteMapEntity, SiteMapReader};
use std::collections::HashSet;
use std::io::{Cursor, Read};

/// Default number of nested sitemap indexes followed below a top-level sitemap
pub const DEFAULT_SITEMAP_MAX_DEPTH: usize = 3;

/// Paths probed when known-path discovery is enabled
pub const KNOWN_SITEMAP_PATHS: &[&str] = &[
    "sitemap.xml",
    "sitemap.xml.gz",
    "sitemap_index.xml",
    "sitemap-index.xml",
    "sitemap_index.xml.gz",
    "wp-sitemap.xml",
];

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Builds the sitemap tree of a website
#[async_trait]
pub trait SitemapSource: Send + Sync {
    /// Builds the sitemap tree for a homepage (`scheme://host[:port]/`)
    ///
    /// Retrieval failures never surface as errors; they produce an empty tree.
    async fn tree_for_homepage(&self, homepage: &str) -> SitemapTree;
}

/// A source for crawls with sitemap seeding disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSitemaps;

#[async_trait]
impl SitemapSource for NoSitemaps {
    async fn tree_for_homepage(&self, _homepage: &str) -> SitemapTree {
        SitemapTree::empty()
    }
}

/// Retrieves sitemaps over HTTP
pub struct HttpSitemapSource {
    client: Client,
    use_known_paths: bool,
    max_depth: usize,
}

impl HttpSitemapSource {
    /// Creates an HTTP sitemap source
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client used for robots.txt and sitemap requests
    /// * `use_known_paths` - Whether to probe [`KNOWN_SITEMAP_PATHS`] as well
    /// * `max_depth` - How many levels of sitemap indexes to follow
    pub fn new(client: Client, use_known_paths: bool, max_depth: usize) -> Self {
        Self {
            client,
            use_known_paths,
            max_depth,
        }
    }

    async fn get(&self, url: &str) -> Option<reqwest::Response> {
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => Some(response),
            Ok(response) => {
                tracing::debug!("Sitemap request to {} returned {}", url, response.status());
                None
            }
            Err(e) => {
                tracing::debug!("Sitemap request to {} failed: {}", url, e);
                None
            }
        }
    }

    async fn robots_sitemaps(&self, homepage: &str) -> Vec<String> {
        let Ok(robots_url) = crate::url::get_robots(homepage) else {
            return Vec::new();
        };
        let Some(response) = self.get(&robots_url).await else {
            return Vec::new();
        };
        match response.text().await {
            Ok(body) => ParsedRobots::from_content(&body).sitemaps(),
            Err(e) => {
                tracing::debug!("Failed to read {}: {}", robots_url, e);
                Vec::new()
            }
        }
    }

    async fn download(&self, location: &str) -> Option<Vec<u8>> {
        let response = self.get(location).await?;
        let gzip_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("gzip"))
            .unwrap_or(false);

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read sitemap {}: {}", location, e);
                return None;
            }
        };

        if gzip_type || body.starts_with(&GZIP_MAGIC) {
            let mut xml = Vec::new();
            if let Err(e) = GzDecoder::new(&body[..]).read_to_end(&mut xml) {
                tracing::debug!("Failed to decompress sitemap {}: {}", location, e);
                return None;
            }
            Some(xml)
        } else {
            Some(body.to_vec())
        }
    }

    /// Downloads and parses a sitemap, following indexes while `depth` allows
    fn fetch_tree<'a>(
        &'a self,
        location: String,
        depth: usize,
        seen: &'a mut HashSet<String>,
    ) -> BoxFuture<'a, Option<SitemapTree>> {
        async move {
            if !seen.insert(location.clone()) {
                return None;
            }
            let xml = self.download(&location).await?;
            let (pages, children) = parse_sitemap(&xml);
            tracing::debug!(
                "Sitemap {} lists {} pages and {} sitemaps",
                location,
                pages.len(),
                children.len()
            );

            let mut tree = SitemapTree::new(location);
            tree.pages = pages;
            for child in children {
                if depth >= self.max_depth {
                    tracing::debug!("Sitemap depth limit reached, skipping {}", child);
                    continue;
                }
                if let Some(sub_tree) = self.fetch_tree(child, depth + 1, seen).await {
                    tree.sub_sitemaps.push(sub_tree);
                }
            }
            Some(tree)
        }
        .boxed()
    }
}

#[async_trait]
impl SitemapSource for HttpSitemapSource {
    async fn tree_for_homepage(&self, homepage: &str) -> SitemapTree {
        let mut locations = self.robots_sitemaps(homepage).await;
        if self.use_known_paths {
            for path in KNOWN_SITEMAP_PATHS {
                let location = format!("{homepage}{path}");
                if !locations.contains(&location) {
                    locations.push(location);
                }
            }
        }

        let mut root = SitemapTree::new(homepage);
        let mut seen = HashSet::new();
        for location in locations {
            if let Some(tree) = self.fetch_tree(location, 0, &mut seen).await {
                root.sub_sitemaps.push(tree);
            }
        }

        tracing::debug!(
            "Sitemap tree for {} has {} pages",
            homepage,
            root.all_pages().count()
        );
        root
    }
}

/// Splits a sitemap document into its page entries and the sitemaps it indexes
fn parse_sitemap(xml: &[u8]) -> (Vec<SitemapPage>, Vec<String>) {
    let mut pages = Vec::new();
    let mut sitemaps = Vec::new();

    for entity in SiteMapReader::new(Cursor::new(xml)) {
        match entity {
            SiteMapEntity::Url(entry) => {
                if let Some(url) = entry.loc.get_url() {
                    pages.push(SitemapPage::new(url.to_string()));
                }
            }
            SiteMapEntity::SiteMap(entry) => {
                if let Some(url) = entry.loc.get_url() {
                    sitemaps.push(url.to_string());
                }
            }
            SiteMapEntity::Err(e) => {
                tracing::trace!("Skipping malformed sitemap entry: {:?}", e);
            }
        }
    }

    (pages, sitemaps)
}
