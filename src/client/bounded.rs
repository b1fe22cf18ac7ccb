use crate::client::{Response, WebClient};
use crate::{ConfigError, Result};
use async_trait::async_trait;
use tokio::sync::Semaphore;

/// Maximum number of concurrent requests accepted by [`BoundedClient::new`]
pub const MAX_CONCURRENT_REQUESTS: usize = 100;

/// A client that caps the number of requests in flight at once
///
/// Fetches beyond the bound wait for a permit before reaching the wrapped client.
pub struct BoundedClient<C> {
    client: C,
    semaphore: Semaphore,
    max_concurrent_requests: usize,
}

impl<C: WebClient> BoundedClient<C> {
    /// Creates a new BoundedClient
    ///
    /// # Arguments
    ///
    /// * `client` - The client that makes the requests
    /// * `max_concurrent_requests` - The maximum amount of concurrent requests
    ///
    /// # Returns
    ///
    /// * `Ok(BoundedClient)` - The bound is between 1 and [`MAX_CONCURRENT_REQUESTS`]
    /// * `Err(ConfigError)` - The bound is out of range
    pub fn new(client: C, max_concurrent_requests: usize) -> std::result::Result<Self, ConfigError> {
        if max_concurrent_requests < 1 || max_concurrent_requests > MAX_CONCURRENT_REQUESTS {
            return Err(ConfigError::Validation(format!(
                "max_concurrent_requests must be between 1 and {}, got {}",
                MAX_CONCURRENT_REQUESTS, max_concurrent_requests
            )));
        }

        Ok(Self {
            client,
            semaphore: Semaphore::new(max_concurrent_requests),
            max_concurrent_requests,
        })
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
    }
}

#[async_trait]
impl<C: WebClient> WebClient for BoundedClient<C> {
    async fn fetch(&self, url: &str) -> Result<Response> {
        // The semaphore is never closed
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| crate::CrawlError::Task(e.to_string()))?;
        self.client.fetch(url).await
    }

    async fn user_agent(&self) -> Option<String> {
        self.client.user_agent().await
    }

    async fn close(&self) -> Result<()> {
        self.client.close().await
    }
}
