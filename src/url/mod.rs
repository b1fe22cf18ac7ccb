//! URL handling module for Sumi-Crawl
//!
//! This module provides homepage derivation (the cache key for politeness and
//! sitemap state), absolutization of relative references and fragment stripping.
//! No further normalization is applied to discovered URLs.

mod domain;
mod normalize;

pub use domain::{get_homepage, get_robots, same_netloc};
pub use normalize::get_absolute;
