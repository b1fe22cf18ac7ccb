use crate::client::{RateLimiter, Response, WebClient};
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A client with a fixed delay between requests, regardless of their domain
///
/// This imposes a conservative global ceiling on top of per-domain politeness.
pub struct DelayedClient<C> {
    client: C,
    limiter: RateLimiter,
}

impl<C: WebClient> DelayedClient<C> {
    /// Creates a new DelayedClient
    ///
    /// # Arguments
    ///
    /// * `client` - The client that makes the requests
    /// * `request_delay` - The minimum delay between two requests
    pub fn new(client: C, request_delay: Duration) -> Self {
        Self {
            client,
            limiter: RateLimiter::new(request_delay),
        }
    }

    /// Returns the wrapped client
    pub fn inner(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: WebClient> WebClient for DelayedClient<C> {
    async fn fetch(&self, url: &str) -> Result<Response> {
        self.limiter.acquire().await;
        self.client.fetch(url).await
    }

    async fn user_agent(&self) -> Option<String> {
        self.client.user_agent().await
    }

    async fn close(&self) -> Result<()> {
        self.client.close().await
    }
}
