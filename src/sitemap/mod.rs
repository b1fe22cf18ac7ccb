//! Sitemap-assisted seeding
//!
//! A [`SitemapSource`] builds the [`SitemapTree`] of a homepage and the
//! [`SitemapCache`] memoizes those trees for the lifetime of a crawl session.

mod cache;
mod source;
mod tree;

pub use cache::SitemapCache;
pub use source::{
    HttpSitemapSource, NoSitemaps, SitemapSource, DEFAULT_SITEMAP_MAX_DEPTH, KNOWN_SITEMAP_PATHS,
};
pub use tree::{SitemapPage, SitemapTree};

#[cfg(test)]
pub(crate) use cache::testing;
