//! Web request clients
//!
//! This module contains the fetch contract that every transport driver implements,
//! along with:
//! - The concurrent fetch engine (`fetch_multiple`)
//! - The plain HTTP transport driver
//! - Decorators layering robots.txt politeness, global request spacing and a
//!   concurrency bound on top of any client
//!
//! A typical chain is `PoliteClient -> DelayedClient -> BoundedClient -> HttpClient`.

mod bounded;
mod delay;
mod http;
mod limiter;
mod multiple;
mod polite;
mod response;

pub use bounded::{BoundedClient, MAX_CONCURRENT_REQUESTS};
pub use delay::DelayedClient;
pub use http::{build_http_client, format_user_agent, HttpClient};
pub use limiter::{RateLimiter, MAX_DELAY};
pub use multiple::{fetch_multiple, FetchStream};
pub use polite::{PoliteClient, WILDCARD_USER_AGENT};
pub use response::{is_webpage, Content, FetchResult, Response, WebResource, WEBPAGE_CONTENT_TYPE};

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A client that makes requests to web resources
///
/// Implementations must be shareable across fetch tasks. Decorators wrap an inner
/// client, intercept `fetch` and delegate `user_agent` and `close`.
#[async_trait]
pub trait WebClient: Send + Sync {
    /// Fetches the content of a web resource
    ///
    /// Unsuccessful HTTP statuses are reported as a `Response` without a web
    /// resource. Only lower-level failures are returned as errors.
    async fn fetch(&self, url: &str) -> Result<Response>;

    /// Gets the user agent of the client, if one is known
    async fn user_agent(&self) -> Option<String>;

    /// Releases any connections or sessions held by the client
    ///
    /// Calling `close` more than once must be harmless.
    async fn close(&self) -> Result<()>;
}

#[async_trait]
impl<T: WebClient + ?Sized> WebClient for Box<T> {
    async fn fetch(&self, url: &str) -> Result<Response> {
        (**self).fetch(url).await
    }

    async fn user_agent(&self) -> Option<String> {
        (**self).user_agent().await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}

#[async_trait]
impl<T: WebClient + ?Sized> WebClient for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Response> {
        (**self).fetch(url).await
    }

    async fn user_agent(&self) -> Option<String> {
        (**self).user_agent().await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}
