//! In-memory sitemap trees

/// A page listed by a sitemap
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SitemapPage {
    pub url: String,
}

impl SitemapPage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A sitemap with its pages and the sitemaps it indexes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapTree {
    /// Location of this sitemap; empty for the synthetic root of a homepage
    pub url: String,

    pub pages: Vec<SitemapPage>,

    pub sub_sitemaps: Vec<SitemapTree>,
}

impl SitemapTree {
    /// A tree with no pages, used when a homepage has no sitemap
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.sub_sitemaps.iter().all(SitemapTree::is_empty)
    }

    /// Lazily iterates the pages of this sitemap, then those of every sub-sitemap depth-first
    pub fn all_pages(&self) -> Box<dyn Iterator<Item = &SitemapPage> + '_> {
        Box::new(
            self.pages
                .iter()
                .chain(self.sub_sitemaps.iter().flat_map(|tree| tree.all_pages())),
        )
    }
}
