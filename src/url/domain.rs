use crate::UrlError;
use url::Url;

/// Gets the homepage of a website
///
/// The homepage is the `scheme://host[:port]/` root of a URL. It is used as the
/// key for per-domain politeness state and for the sitemap cache.
///
/// # Arguments
///
/// * `url` - Any URL belonging to the website
///
/// # Returns
///
/// * `Ok(String)` - The homepage, always ending with `/`
/// * `Err(UrlError)` - The URL could not be parsed or has no host
///
/// # Examples
///
/// ```
/// use sumi_crawl::url::get_homepage;
///
/// assert_eq!(get_homepage("https://example.com/a/b?c=d").unwrap(), "https://example.com/");
/// assert_eq!(get_homepage("http://localhost:8080/page").unwrap(), "http://localhost:8080/");
/// ```
pub fn get_homepage(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
    let host = parsed.host_str().ok_or(UrlError::MissingDomain)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
    }

    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}/", parsed.scheme(), host, port),
        None => format!("{}://{}/", parsed.scheme(), host),
    })
}

/// Gets the robots.txt location of a website
pub fn get_robots(url: &str) -> Result<String, UrlError> {
    Ok(format!("{}robots.txt", get_homepage(url)?))
}

/// Checks whether two URLs share the same host and port
pub fn same_netloc(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port() == b.port()
}
