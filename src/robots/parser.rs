//! Robots.txt parser implementation
//!
//! This module provides functionality for parsing robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Policy {
    AllowAll,
    DisallowAll,
    Rules(String),
}

/// Parsed robots.txt data
///
/// This is a wrapper around the robotstxt crate's matcher, providing a simplified
/// interface for checking if URLs are allowed and reading crawl delays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    policy: Policy,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    ///
    /// # Returns
    ///
    /// A ParsedRobots instance that can be used to check URL permissions
    pub fn from_content(content: &str) -> Self {
        Self {
            policy: Policy::Rules(content.to_string()),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when a site has no robots.txt.
    pub fn allow_all() -> Self {
        Self {
            policy: Policy::AllowAll,
        }
    }

    /// Creates a ParsedRobots that forbids everything
    ///
    /// This is used when access to robots.txt itself is denied or the server fails.
    pub fn disallow_all() -> Self {
        Self {
            policy: Policy::DisallowAll,
        }
    }

    /// Returns the raw robots.txt content, empty unless parsed from content
    pub fn content(&self) -> &str {
        match &self.policy {
            Policy::Rules(content) => content,
            _ => "",
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The URL (or URL path) to check
    /// * `user_agent` - The user agent string
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.policy {
            Policy::AllowAll => true,
            Policy::DisallowAll => false,
            Policy::Rules(content) if content.trim().is_empty() => true,
            Policy::Rules(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A group naming the agent takes precedence over the wildcard group.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - The user agent string
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no crawl delay is specified
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let Policy::Rules(content) = &self.policy else {
            return None;
        };

        // Format: Crawl-delay: <seconds>
        // Consecutive User-agent lines form one group; any other directive closes
        // the list of agents for that group.
        let mut group_agents: Vec<String> = Vec::new();
        let mut collecting_agents = false;
        let mut crawl_delay_for_wildcard: Option<f64> = None;
        let mut crawl_delay_for_agent: Option<f64> = None;

        let normalized_agent = user_agent.to_lowercase();

        for line in content.lines() {
            let trimmed = line.split('#').next().unwrap_or("").trim();
            if trimmed.is_empty() {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !collecting_agents {
                        group_agents.clear();
                        collecting_agents = true;
                    }
                    group_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    collecting_agents = false;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    let names_agent = group_agents
                        .iter()
                        .any(|ua| ua != "*" && !ua.is_empty() && normalized_agent.contains(ua.as_str()));
                    if names_agent {
                        crawl_delay_for_agent.get_or_insert(delay);
                    } else if group_agents.iter().any(|ua| ua == "*") {
                        crawl_delay_for_wildcard.get_or_insert(delay);
                    }
                }
                _ => collecting_agents = false,
            }
        }

        crawl_delay_for_agent.or(crawl_delay_for_wildcard)
    }

    /// Lists the sitemap locations declared with `Sitemap:` directives
    pub fn sitemaps(&self) -> Vec<String> {
        self.content()
            .lines()
            .filter_map(|line| {
                let (key, value) = line.trim().split_once(':')?;
                if key.trim().eq_ignore_ascii_case("sitemap") {
                    Some(value.trim().to_string())
                } else {
                    None
                }
            })
            .filter(|location| !location.is_empty())
            .collect()
    }
}
