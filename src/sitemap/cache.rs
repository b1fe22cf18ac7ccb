use crate::sitemap::{NoSitemaps, SitemapSource, SitemapTree};
use crate::url::get_homepage;
use crate::UrlResult;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Memoizes the sitemap tree of every homepage a crawl touches
///
/// Each homepage's tree is built at most once per cache, so domains are never
/// asked for their sitemaps twice during a session.
pub struct SitemapCache {
    source: Arc<dyn SitemapSource>,
    trees: HashMap<String, SitemapTree>,
}

impl SitemapCache {
    pub fn new(source: Arc<dyn SitemapSource>) -> Self {
        Self {
            source,
            trees: HashMap::new(),
        }
    }

    /// A cache whose trees are always empty
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoSitemaps))
    }

    /// Gets the sitemap tree of the homepage `url` belongs to, building it on first use
    ///
    /// # Returns
    ///
    /// * `Ok(&SitemapTree)` - The memoized tree of the homepage
    /// * `Err(UrlError)` - The homepage of `url` cannot be determined
    pub async fn lookup(&mut self, url: &str) -> UrlResult<&SitemapTree> {
        let homepage = get_homepage(url)?;
        match self.trees.entry(homepage) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                tracing::debug!("Building sitemap tree for {}", entry.key());
                let tree = self.source.tree_for_homepage(entry.key()).await;
                Ok(entry.insert(tree))
            }
        }
    }

    /// Whether a tree has already been built for `homepage`
    pub fn contains(&self, homepage: &str) -> bool {
        self.trees.contains_key(homepage)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Collects the page URLs of a tree
    ///
    /// # Arguments
    ///
    /// * `tree` - The tree to read
    /// * `max_urls` - The maximum number of page entries to enumerate; `None` or `0` reads all
    pub fn extract_urls(tree: &SitemapTree, max_urls: Option<usize>) -> HashSet<String> {
        let pages = tree.all_pages().map(|page| page.url.clone());
        match max_urls.filter(|&max| max > 0) {
            Some(max) => pages.take(max).collect(),
            None => pages.collect(),
        }
    }
}
