//! HTML link extraction
//!
//! Links are read from `<a href="...">` tags, resolved against the URL of the
//! page they were found on and stripped of fragments. Only `http` and `https`
//! targets with a host are kept, so `javascript:`, `mailto:`, `tel:` and data
//! URIs never reach the crawl queue.

use crate::url::{get_absolute, same_netloc};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Gets the raw `href` values of every anchor in the HTML content
fn get_hrefs(document: &Html) -> Vec<&str> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .collect()
}

fn absolute_links(base_url: &str, content: &str) -> Option<(Url, Vec<Url>)> {
    let base = Url::parse(base_url).ok()?;
    let document = Html::parse_document(content);
    let links = get_absolute(&base, get_hrefs(&document));
    Some((base, links))
}

/// Gets the absolute URLs (with no fragments) linked from webpage content
///
/// # Arguments
///
/// * `base_url` - The URL of the page the content was fetched from
/// * `content` - The HTML content
///
/// # Returns
///
/// The linked URLs; empty when `base_url` is not a valid absolute URL
///
/// # Example
///
/// ```
/// use sumi_crawl::crawler::extract_absolute_urls;
///
/// let html = r#"<a href="/about#team">About</a><a href="https://other.com/">Other</a>"#;
/// let urls = extract_absolute_urls("https://example.com/", html);
/// assert!(urls.contains("https://example.com/about"));
/// assert!(urls.contains("https://other.com/"));
/// ```
pub fn extract_absolute_urls(base_url: &str, content: &str) -> HashSet<String> {
    absolute_links(base_url, content)
        .map(|(_, links)| links.into_iter().map(String::from).collect())
        .unwrap_or_default()
}

/// Gets the absolute URLs linked from webpage content that share the page's host and port
pub fn extract_internal_urls(base_url: &str, content: &str) -> HashSet<String> {
    absolute_links(base_url, content)
        .map(|(base, links)| {
            links
                .into_iter()
                .filter(|link| same_netloc(&base, link))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_URL: &str = "https://example.com/page";

    fn set(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        assert_eq!(
            extract_absolute_urls(BASE_URL, html),
            set(&["https://other.com/page"])
        );
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        assert_eq!(
            extract_absolute_urls(BASE_URL, html),
            set(&["https://example.com/other"])
        );
    }

    #[test]
    fn test_extract_relative_path_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        assert_eq!(
            extract_absolute_urls(BASE_URL, html),
            set(&["https://example.com/other"])
        );
    }

    #[test]
    fn test_skip_javascript_link() {
        let html = r#"<html><body><a href="javascript:void(0)">Link</a></body></html>"#;
        assert!(extract_absolute_urls(BASE_URL, html).is_empty());
    }

    #[test]
    fn test_skip_mailto_and_tel_links() {
        let html = r#"<a href="mailto:test@example.com">Email</a><a href="tel:+1234567890">Call</a>"#;
        assert!(extract_absolute_urls(BASE_URL, html).is_empty());
    }

    #[test]
    fn test_skip_data_uri() {
        let html = r#"<html><body><a href="data:text/html,<h1>Test</h1>">Data</a></body></html>"#;
        assert!(extract_absolute_urls(BASE_URL, html).is_empty());
    }

    #[test]
    fn test_fragments_removed() {
        let html = r##"<a href="/a#one">A</a><a href="/a#two">A again</a><a href="#top">Top</a>"##;
        assert_eq!(
            extract_absolute_urls(BASE_URL, html),
            set(&["https://example.com/a", "https://example.com/page"])
        );
    }

    #[test]
    fn test_follow_nofollow_links() {
        let html = r#"<html><body><a href="/page" rel="nofollow">Link</a></body></html>"#;
        assert_eq!(
            extract_absolute_urls(BASE_URL, html),
            set(&["https://example.com/page"])
        );
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let html = r#"<a name="anchor">No link</a><link href="/style.css" rel="stylesheet">"#;
        assert!(extract_absolute_urls(BASE_URL, html).is_empty());
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let html = r#"
            <html>
            <body>
                <a href="/valid">Valid</a>
                <a href="javascript:alert('no')">Invalid</a>
                <a href="mailto:test@example.com">Invalid</a>
                <a href="/another-valid">Valid</a>
            </body>
            </html>
        "#;
        assert_eq!(extract_absolute_urls(BASE_URL, html).len(), 2);
    }

    #[test]
    fn test_internal_only() {
        let html = r#"
            <a href="http://a.test/x">X</a>
            <a href="http://b.test/y">Y</a>
            <a href="http://a.test:8080/z">Other port</a>
        "#;
        assert_eq!(
            extract_internal_urls("http://a.test/", html),
            set(&["http://a.test/x"])
        );
    }

    #[test]
    fn test_empty_content() {
        assert!(extract_absolute_urls(BASE_URL, "").is_empty());
        assert!(extract_internal_urls(BASE_URL, "").is_empty());
    }

    #[test]
    fn test_invalid_base() {
        let html = r#"<a href="https://other.com/">Other</a>"#;
        assert!(extract_absolute_urls("not a url", html).is_empty());
    }
}
