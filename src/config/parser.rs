use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_crawl::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Limit: {:?}", config.crawler.limit);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This identifies the exact configuration a crawl ran with in the logs.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok((Config, String))` - Successfully loaded configuration and its hash
/// * `Err(ConfigError)` - Failed to load or parse the configuration
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::CrawlTarget;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const USER_AGENT_SECTION: &str = r#"
[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"
"#;

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
seeds = ["https://example.com/", "http://localhost:8080/"]
limit = 500
target = "pages"
internal-only = false
timeout-secs = 60
max-concurrent-requests = 10

[politeness]
respect-robots = false
request-delay-ms = 250
robots-cache-ttl-secs = 3600

[sitemap]
enabled = false
use-known-paths = true
max-depth = 2

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.seeds.len(), 2);
        assert_eq!(config.crawler.limit, Some(500));
        assert_eq!(config.crawler.target, CrawlTarget::Pages);
        assert!(!config.crawler.internal_only);
        assert_eq!(config.crawler.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.crawler.max_concurrent_requests, 10);
        assert!(!config.politeness.respect_robots);
        assert_eq!(config.politeness.request_delay(), Duration::from_millis(250));
        assert_eq!(config.politeness.robots_cache_ttl_secs, Some(3600));
        assert!(!config.sitemap.enabled);
        assert!(config.sitemap.use_known_paths);
        assert_eq!(config.sitemap.max_depth, 2);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
    }

    #[test]
    fn test_defaults() {
        let content = format!(
            "[crawler]\nseeds = [\"https://example.com/\"]\n{}",
            USER_AGENT_SECTION
        );
        let config = parse_config(&content).unwrap();

        assert_eq!(config.crawler.limit, None);
        assert_eq!(config.crawler.target, CrawlTarget::Urls);
        assert!(config.crawler.internal_only);
        assert_eq!(config.crawler.timeout(), None);
        assert_eq!(config.crawler.max_concurrent_requests, 16);
        assert!(config.politeness.respect_robots);
        assert_eq!(config.politeness.request_delay_ms, 0);
        assert_eq!(config.politeness.robots_cache_ttl_secs, None);
        assert!(config.sitemap.enabled);
        assert!(!config.sitemap.use_known_paths);
        assert_eq!(config.sitemap.max_depth, 3);
    }

    #[test]
    fn test_unknown_target_rejected() {
        let content = format!(
            "[crawler]\nseeds = [\"https://example.com/\"]\ntarget = \"bytes\"\n{}",
            USER_AGENT_SECTION
        );
        assert!(matches!(parse_config(&content), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = format!(
            "[crawler]\nseeds = [\"https://example.com/\"]\nmax-concurrent-requests = 0\n{}",
            USER_AGENT_SECTION
        );

        let file = create_temp_config(&config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let config_content = "test content";
        let file = create_temp_config(config_content);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_load_config_with_hash() {
        let content = format!(
            "[crawler]\nseeds = [\"https://example.com/\"]\n{}",
            USER_AGENT_SECTION
        );
        let file = create_temp_config(&content);
        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.crawler.seeds, vec!["https://example.com/".to_string()]);
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }
}
