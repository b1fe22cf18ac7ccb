//! Breadth-first URL discovery
//!
//! Each wave dequeues every URL waiting in the queue, seeds the queue from the
//! sitemaps of those URLs' homepages, fetches them concurrently and enqueues
//! the links found in the responses. A wave is fully processed before the next
//! one is fetched.

use crate::client::{fetch_multiple, FetchStream, WebClient};
use crate::crawler::parser::{extract_absolute_urls, extract_internal_urls};
use crate::sitemap::SitemapCache;
use futures::StreamExt;
use serde::Deserialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The unit a discovery limit is measured in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlTarget {
    /// Stop once this many new URLs have been discovered
    #[default]
    Urls,

    /// Stop once this many webpages have been parsed for links
    Pages,
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlTarget::Urls => write!(f, "urls"),
            CrawlTarget::Pages => write!(f, "pages"),
        }
    }
}

type LinkExtractor = fn(&str, &str) -> HashSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    LimitReached,
    Cancelled,
}

/// Bookkeeping local to one run
struct Run {
    queue: VecDeque<String>,
    discovered: HashSet<String>,
    pages_crawled: usize,
    limit: Option<usize>,
    target: CrawlTarget,
}

impl Run {
    fn url_limit_reached(&self) -> bool {
        self.target == CrawlTarget::Urls && self.limit == Some(self.discovered.len())
    }

    fn page_limit_reached(&self) -> bool {
        self.target == CrawlTarget::Pages && self.limit == Some(self.pages_crawled)
    }

    /// Caps sitemap enumeration at the URL limit; page crawls read whole sitemaps
    fn sitemap_cap(&self) -> Option<usize> {
        match self.target {
            CrawlTarget::Urls => self.limit,
            CrawlTarget::Pages => None,
        }
    }
}

/// A breadth-first crawl that discovers webpage URLs
///
/// The visited set and the sitemap cache are borrowed from the caller so that
/// consecutive crawls never revisit a URL or rebuild a homepage's sitemap.
pub struct BreadthCrawl<'a> {
    client: Arc<dyn WebClient>,
    visited_urls: &'a mut HashSet<String>,
    sitemap_cache: &'a mut SitemapCache,
    cancel: CancellationToken,
}

impl<'a> BreadthCrawl<'a> {
    /// Creates a crawl
    ///
    /// # Arguments
    ///
    /// * `client` - The client used to fetch webpages
    /// * `visited_urls` - URLs that were already visited; they will not be revisited
    /// * `sitemap_cache` - The cache of homepage sitemaps
    pub fn new(
        client: Arc<dyn WebClient>,
        visited_urls: &'a mut HashSet<String>,
        sitemap_cache: &'a mut SitemapCache,
    ) -> Self {
        Self {
            client,
            visited_urls,
            sitemap_cache,
            cancel: CancellationToken::new(),
        }
    }

    /// Stops the crawl when `cancel` is triggered, returning what was discovered so far
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Crawls webpages to discover URLs
    ///
    /// # Arguments
    ///
    /// * `seeds` - The URLs the crawl starts at
    /// * `limit` - The maximum number of targets to crawl or discover; `None` or `0` for no limit
    /// * `target` - The unit the limit is measured in
    /// * `internal_only` - Whether only links sharing the host and port of their page are followed
    ///
    /// # Returns
    ///
    /// The URLs discovered during this crawl. Seeds are not part of the result.
    /// Cancellation ends the crawl early with the URLs discovered so far.
    pub async fn execute<I, S>(
        &mut self,
        seeds: I,
        limit: Option<usize>,
        target: CrawlTarget,
        internal_only: bool,
    ) -> HashSet<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extract: LinkExtractor = if internal_only {
            extract_internal_urls
        } else {
            extract_absolute_urls
        };

        let mut run = Run {
            queue: VecDeque::new(),
            discovered: HashSet::new(),
            pages_crawled: 0,
            limit: limit.filter(|&limit| limit > 0),
            target,
        };

        for seed in seeds {
            let seed = seed.into();
            if self.visited_urls.insert(seed.clone()) {
                run.queue.push_back(seed);
            } else {
                tracing::debug!("Skipping already visited seed {}", seed);
            }
        }

        let flow = self.crawl(&mut run, extract).await;
        tracing::info!(
            "Crawl finished ({:?}): {} URLs discovered, {} pages crawled",
            flow,
            run.discovered.len(),
            run.pages_crawled
        );
        run.discovered
    }

    async fn crawl(&mut self, run: &mut Run, extract: LinkExtractor) -> Flow {
        let mut wave = 0usize;
        while !run.queue.is_empty() {
            wave += 1;
            let urls: Vec<String> = run.queue.drain(..).collect();
            tracing::debug!("Wave {}: {} URLs", wave, urls.len());

            for url in &urls {
                let flow = self.track_sitemap_urls(url, run).await;
                if flow != Flow::Continue {
                    return flow;
                }
            }

            let responses = fetch_multiple(&self.client, urls);
            let flow = self.process_responses(responses, run, extract).await;
            if flow != Flow::Continue {
                return flow;
            }
        }
        Flow::Continue
    }

    /// Tracks a newly discovered URL so it is never revisited
    ///
    /// Returns `false` if the URL was already visited.
    fn track_new_url(&mut self, url: String, run: &mut Run) -> bool {
        if !self.visited_urls.insert(url.clone()) {
            return false;
        }
        run.discovered.insert(url.clone());
        run.queue.push_back(url);
        true
    }

    async fn track_sitemap_urls(&mut self, url: &str, run: &mut Run) -> Flow {
        let cap = run.sitemap_cap();
        let sitemap_urls = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Flow::Cancelled,
            tree = self.sitemap_cache.lookup(url) => match tree {
                Ok(tree) => SitemapCache::extract_urls(tree, cap),
                Err(e) => {
                    tracing::debug!("No sitemap for {}: {}", url, e);
                    return Flow::Continue;
                }
            },
        };

        for sitemap_url in sitemap_urls {
            if self.track_new_url(sitemap_url, run) && run.url_limit_reached() {
                return Flow::LimitReached;
            }
        }
        Flow::Continue
    }

    async fn process_responses(
        &mut self,
        mut responses: FetchStream,
        run: &mut Run,
        extract: LinkExtractor,
    ) -> Flow {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                next = responses.next() => Some(next),
            };
            let Some(next) = next else {
                responses.close().await;
                return Flow::Cancelled;
            };
            let Some(result) = next else {
                return Flow::Continue;
            };

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!("Skipping failed fetch: {}", e);
                    continue;
                }
            };
            if !response.is_parsable() {
                continue;
            }
            let Some(resource) = response.web_resource else {
                continue;
            };

            let links = extract(&response.fetch.url, &resource.content.as_text());
            for link in links {
                if self.track_new_url(link, run) && run.url_limit_reached() {
                    responses.close().await;
                    return Flow::LimitReached;
                }
            }

            run.pages_crawled += 1;
            if run.page_limit_reached() {
                responses.close().await;
                return Flow::LimitReached;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockClient;
    use crate::sitemap::testing::StaticSitemaps;
    use std::time::Duration;

    fn set(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    fn link_page(links: &[&str]) -> String {
        links
            .iter()
            .map(|link| format!(r#"<a href="{link}">{link}</a>"#))
            .collect()
    }

    async fn run_crawl(
        client: MockClient,
        seeds: &[&str],
        limit: Option<usize>,
        target: CrawlTarget,
        internal_only: bool,
    ) -> HashSet<String> {
        let client: Arc<dyn WebClient> = Arc::new(client);
        let mut visited = HashSet::new();
        let mut sitemaps = SitemapCache::disabled();
        BreadthCrawl::new(client, &mut visited, &mut sitemaps)
            .execute(seeds.iter().copied(), limit, target, internal_only)
            .await
    }

    #[tokio::test]
    async fn test_internal_only_scenario() {
        let client = MockClient::new().page(
            "http://a.test/",
            &link_page(&["http://a.test/x", "http://b.test/y"]),
        );
        let discovered = run_crawl(client, &["http://a.test/"], None, CrawlTarget::Urls, true).await;
        assert_eq!(discovered, set(&["http://a.test/x"]));
    }

    #[tokio::test]
    async fn test_external_links_followed() {
        let client = MockClient::new().page(
            "http://a.test/",
            &link_page(&["http://a.test/x", "http://b.test/y"]),
        );
        let discovered =
            run_crawl(client, &["http://a.test/"], None, CrawlTarget::Urls, false).await;
        assert_eq!(discovered, set(&["http://a.test/x", "http://b.test/y"]));
    }

    #[tokio::test]
    async fn test_empty_body_discovers_nothing() {
        let client = MockClient::new().page("http://a.test/", "");
        let discovered = run_crawl(client, &["http://a.test/"], None, CrawlTarget::Urls, true).await;
        assert!(discovered.is_empty());
    }

    #[tokio::test]
    async fn test_multiple_waves() {
        let client = MockClient::new()
            .page("http://a.test/", &link_page(&["/1", "/2"]))
            .page("http://a.test/1", &link_page(&["/3", "/"]))
            .page("http://a.test/2", &link_page(&["/3", "/4"]))
            .page("http://a.test/3", &link_page(&["/1"]));
        let discovered = run_crawl(client, &["http://a.test/"], None, CrawlTarget::Urls, true).await;
        assert_eq!(
            discovered,
            set(&["http://a.test/1", "http://a.test/2", "http://a.test/3", "http://a.test/4"])
        );
    }

    #[tokio::test]
    async fn test_each_url_fetched_once() {
        let client = Arc::new(
            MockClient::new()
                .page("http://a.test/", &link_page(&["/1", "/2"]))
                .page("http://a.test/1", &link_page(&["/2", "/"]))
                .page("http://a.test/2", &link_page(&["/1", "/"])),
        );
        let dyn_client: Arc<dyn WebClient> = client.clone();
        let mut visited = HashSet::new();
        let mut sitemaps = SitemapCache::disabled();
        BreadthCrawl::new(dyn_client, &mut visited, &mut sitemaps)
            .execute(["http://a.test/", "http://a.test/"], None, CrawlTarget::Urls, true)
            .await;

        let mut fetched = client.fetched();
        fetched.sort();
        assert_eq!(fetched, vec!["http://a.test/", "http://a.test/1", "http://a.test/2"]);
    }

    #[tokio::test]
    async fn test_url_limit_stops_mid_wave() {
        let links: Vec<String> = (0..20).map(|i| format!("/{i}")).collect();
        let links: Vec<&str> = links.iter().map(String::as_str).collect();
        let client = MockClient::new().page("http://a.test/", &link_page(&links));

        let discovered =
            run_crawl(client, &["http://a.test/"], Some(5), CrawlTarget::Urls, true).await;
        assert_eq!(discovered.len(), 5);
    }

    #[tokio::test]
    async fn test_zero_limit_means_unlimited() {
        let client = MockClient::new().page("http://a.test/", &link_page(&["/1", "/2", "/3"]));
        let discovered =
            run_crawl(client, &["http://a.test/"], Some(0), CrawlTarget::Urls, true).await;
        assert_eq!(discovered.len(), 3);
    }

    #[tokio::test]
    async fn test_page_limit_counts_parsable_responses() {
        let client = Arc::new(
            MockClient::new()
                .page("http://a.test/", &link_page(&["/1", "/2", "/missing"]))
                .page("http://a.test/1", &link_page(&["/3"]))
                .page("http://a.test/2", &link_page(&["/4"]))
                .page("http://a.test/3", &link_page(&["/5"]))
                .page("http://a.test/4", &link_page(&["/6"])),
        );
        let dyn_client: Arc<dyn WebClient> = client.clone();
        let mut visited = HashSet::new();
        let mut sitemaps = SitemapCache::disabled();
        let discovered = BreadthCrawl::new(dyn_client, &mut visited, &mut sitemaps)
            .execute(["http://a.test/"], Some(3), CrawlTarget::Pages, true)
            .await;

        // The seed plus both pages of the second wave; /missing is not parsable
        assert!(discovered.contains("http://a.test/1"));
        assert!(discovered.contains("http://a.test/3"));
        assert!(discovered.contains("http://a.test/4"));
        assert!(!discovered.contains("http://a.test/5"));
        assert_eq!(discovered.len(), 5);
    }

    #[tokio::test]
    async fn test_second_run_is_disjoint() {
        let client: Arc<dyn WebClient> = Arc::new(
            MockClient::new()
                .page("http://a.test/", &link_page(&["/1", "/2"]))
                .page("http://a.test/1", &link_page(&["/3"])),
        );
        let mut visited = HashSet::new();
        let mut sitemaps = SitemapCache::disabled();

        let first = BreadthCrawl::new(client.clone(), &mut visited, &mut sitemaps)
            .execute(["http://a.test/"], Some(1), CrawlTarget::Urls, true)
            .await;
        let second = BreadthCrawl::new(client, &mut visited, &mut sitemaps)
            .execute(["http://a.test/", "http://a.test/1"], None, CrawlTarget::Urls, true)
            .await;

        assert_eq!(first.len(), 1);
        assert!(first.is_disjoint(&second));
    }

    #[tokio::test]
    async fn test_sitemap_urls_tracked_before_links() {
        let client: Arc<dyn WebClient> = Arc::new(
            MockClient::new().page("http://a.test/", &link_page(&["/linked"])),
        );
        let source = Arc::new(
            StaticSitemaps::new().with_pages("http://a.test/", &["http://a.test/from-sitemap"]),
        );
        let mut visited = HashSet::new();
        let mut sitemaps = SitemapCache::new(source.clone());

        let discovered = BreadthCrawl::new(client, &mut visited, &mut sitemaps)
            .execute(["http://a.test/"], Some(1), CrawlTarget::Urls, true)
            .await;
        assert_eq!(discovered, set(&["http://a.test/from-sitemap"]));
        assert_eq!(source.builds(), 1);
    }

    #[tokio::test]
    async fn test_sitemap_built_once_per_homepage() {
        let client: Arc<dyn WebClient> = Arc::new(
            MockClient::new()
                .page("http://a.test/", &link_page(&["/1"]))
                .page("http://a.test/1", &link_page(&["/2"])),
        );
        let source = Arc::new(StaticSitemaps::new());
        let mut visited = HashSet::new();
        let mut sitemaps = SitemapCache::new(source.clone());

        BreadthCrawl::new(client, &mut visited, &mut sitemaps)
            .execute(["http://a.test/"], None, CrawlTarget::Urls, true)
            .await;
        assert_eq!(source.builds(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetches_skipped() {
        let client = MockClient::new()
            .page("http://a.test/", &link_page(&["/broken", "/ok"]))
            .failing("http://a.test/broken")
            .page("http://a.test/ok", &link_page(&["/next"]));
        let discovered = run_crawl(client, &["http://a.test/"], None, CrawlTarget::Urls, true).await;
        assert_eq!(
            discovered,
            set(&["http://a.test/broken", "http://a.test/ok", "http://a.test/next"])
        );
    }

    #[tokio::test]
    async fn test_cancellation_returns_partial_result() {
        let client = Arc::new(
            MockClient::new()
                .page("http://a.test/", &link_page(&["/fast", "/slow"]))
                .page("http://a.test/fast", &link_page(&["/after-fast"]))
                .slow("http://a.test/slow", Duration::from_secs(60)),
        );
        let dyn_client: Arc<dyn WebClient> = client.clone();
        let mut visited = HashSet::new();
        let mut sitemaps = SitemapCache::disabled();
        let cancel = CancellationToken::new();

        let timer = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                cancel.cancel();
            })
        };

        let started = tokio::time::Instant::now();
        let discovered = BreadthCrawl::new(dyn_client, &mut visited, &mut sitemaps)
            .with_cancellation(cancel)
            .execute(["http://a.test/"], None, CrawlTarget::Urls, true)
            .await;
        timer.await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(
            discovered,
            set(&["http://a.test/fast", "http://a.test/slow", "http://a.test/after-fast"])
        );

        // The slow fetch was aborted, not left running in the background
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(client.fetched().contains(&"http://a.test/slow".to_string()));
        assert_eq!(client.completed(), client.fetched().len() - 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let client: Arc<dyn WebClient> =
            Arc::new(MockClient::new().page("http://a.test/", &link_page(&["/1"])));
        let mut visited = HashSet::new();
        let mut sitemaps = SitemapCache::disabled();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let discovered = BreadthCrawl::new(client, &mut visited, &mut sitemaps)
            .with_cancellation(cancel)
            .execute(["http://a.test/"], None, CrawlTarget::Urls, true)
            .await;
        assert!(discovered.is_empty());
    }

    #[test]
    fn test_crawl_target_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            target: CrawlTarget,
        }
        let parsed: Wrapper = toml::from_str(r#"target = "pages""#).unwrap();
        assert_eq!(parsed.target, CrawlTarget::Pages);
        assert_eq!(CrawlTarget::default(), CrawlTarget::Urls);
        assert_eq!(CrawlTarget::Urls.to_string(), "urls");
    }
}
