use crate::client::MAX_CONCURRENT_REQUESTS;
use crate::config::types::{Config, CrawlerConfig, SitemapConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Deepest sitemap index nesting a configuration may request
pub const MAX_SITEMAP_DEPTH: usize = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_sitemap_config(&config.sitemap)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_seed(seed)?;
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > MAX_CONCURRENT_REQUESTS
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and {}, got {}",
            MAX_CONCURRENT_REQUESTS, config.max_concurrent_requests
        )));
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates a seed URL: absolute, http or https, with a host
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use the HTTP or HTTPS scheme",
            seed
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Validates sitemap configuration
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    if config.max_depth > MAX_SITEMAP_DEPTH {
        return Err(ConfigError::Validation(format!(
            "sitemap max_depth must be <= {}, got {}",
            MAX_SITEMAP_DEPTH, config.max_depth
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    // Validate contact email (basic validation)
    validate_email(&config.contact_email)?;

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Must contain a single @ with text on both sides
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
