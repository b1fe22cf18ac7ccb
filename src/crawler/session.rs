use crate::client::WebClient;
use crate::crawler::{BreadthCrawl, CrawlTarget};
use crate::sitemap::SitemapCache;
use crate::Result;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Options for a single crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// The maximum number of targets to crawl or discover; `None` or `Some(0)` for no limit
    pub limit: Option<usize>,

    /// Wall-clock budget of the crawl
    pub timeout: Option<Duration>,

    /// The unit `limit` is measured in
    pub target: CrawlTarget,

    /// Whether only links sharing the host and port of their page are followed
    pub internal_only: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            limit: None,
            timeout: None,
            target: CrawlTarget::Urls,
            internal_only: true,
        }
    }
}

/// A crawling session
///
/// The session owns the set of visited URLs and the sitemap cache, so repeated
/// crawls never rediscover a URL or rebuild a homepage's sitemap. Taking
/// `&mut self` in [`Crawler::crawl`] keeps two crawls of one session from
/// running at once.
pub struct Crawler {
    client: Arc<dyn WebClient>,
    visited_urls: HashSet<String>,
    sitemap_cache: SitemapCache,
}

impl Crawler {
    /// Creates a session
    ///
    /// # Arguments
    ///
    /// * `client` - The client used to fetch webpages
    /// * `sitemap_cache` - The cache used for sitemap seeding; [`SitemapCache::disabled`] turns it off
    pub fn new(client: Arc<dyn WebClient>, sitemap_cache: SitemapCache) -> Self {
        Self {
            client,
            visited_urls: HashSet::new(),
            sitemap_cache,
        }
    }

    /// URLs visited by any crawl of this session, seeds included
    pub fn visited_urls(&self) -> &HashSet<String> {
        &self.visited_urls
    }

    /// The client chain used for every fetch of this session
    pub fn client(&self) -> &Arc<dyn WebClient> {
        &self.client
    }

    /// Crawls webpages to discover URLs
    ///
    /// When `options.timeout` elapses the crawl stops and the URLs discovered so
    /// far are returned; running out of time is not an error.
    ///
    /// # Returns
    ///
    /// The URLs discovered by this crawl and no previous one
    pub async fn crawl<I, S>(&mut self, seeds: I, options: &CrawlOptions) -> HashSet<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cancel = CancellationToken::new();
        let timer = options.timeout.map(|timeout| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                tracing::info!("Crawl timed out after {:?}", timeout);
                cancel.cancel();
            })
        });

        let discovered = self.crawl_until_cancelled(seeds, options, cancel).await;

        if let Some(timer) = timer {
            timer.abort();
        }
        discovered
    }

    /// Crawls webpages until done or until `cancel` is triggered
    ///
    /// `options.timeout` is ignored; the caller decides when to cancel.
    pub async fn crawl_until_cancelled<I, S>(
        &mut self,
        seeds: I,
        options: &CrawlOptions,
        cancel: CancellationToken,
    ) -> HashSet<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BreadthCrawl::new(
            Arc::clone(&self.client),
            &mut self.visited_urls,
            &mut self.sitemap_cache,
        )
        .with_cancellation(cancel)
        .execute(seeds, options.limit, options.target, options.internal_only)
        .await
    }

    /// Releases the resources held by the client
    pub async fn close(&self) -> Result<()> {
        self.client.close().await
    }
}
