//! Concurrent fetch engine
//!
//! `fetch_multiple` spawns one task per URL and exposes the results as a stream in
//! completion order. A failing task never aborts the stream: its error takes the
//! task's place in the sequence. Closing the stream early aborts every task that has
//! not completed yet and waits for all of them to settle.

use crate::client::{Response, WebClient};
use crate::{CrawlError, Result};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::{JoinError, JoinSet};

/// Results of concurrently issued fetches, in completion order
///
/// Dropping the stream aborts all outstanding fetch tasks. Use [`FetchStream::close`]
/// to also wait until every aborted task has finished unwinding.
pub struct FetchStream {
    tasks: JoinSet<Result<Response>>,
}

/// Fetches the content of multiple web resources concurrently
///
/// Every fetch is issued immediately as its own task. No guarantee is made that
/// results correlate with the input order.
///
/// # Arguments
///
/// * `client` - The client used for every fetch
/// * `urls` - The URLs to fetch
///
/// # Returns
///
/// A [`FetchStream`] yielding one item per URL
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt;
/// use std::sync::Arc;
/// use sumi_crawl::client::{fetch_multiple, HttpClient, WebClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client: Arc<dyn WebClient> = Arc::new(HttpClient::new(None)?);
/// let mut responses = fetch_multiple(&client, ["https://example.com/", "https://example.org/"]);
/// while let Some(response) = responses.next().await {
///     match response {
///         Ok(response) => println!("{}", response.fetch),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn fetch_multiple<I, S>(client: &Arc<dyn WebClient>, urls: I) -> FetchStream
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tasks = JoinSet::new();
    for url in urls {
        let client = Arc::clone(client);
        let url: String = url.into();
        tasks.spawn(async move { client.fetch(&url).await });
    }
    tracing::trace!("Spawned {} fetch tasks", tasks.len());

    FetchStream { tasks }
}

impl FetchStream {
    /// Number of fetches that have not been yielded yet
    pub fn remaining(&self) -> usize {
        self.tasks.len()
    }

    /// Cancels every fetch that has not completed and waits for all of them to settle
    ///
    /// Failures caused by the cancellation are discarded.
    pub async fn close(mut self) {
        let outstanding = self.tasks.len();
        self.tasks.abort_all();
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::warn!("Fetch task panicked while closing: {}", e);
                }
            }
        }
        if outstanding > 0 {
            tracing::debug!("Cancelled {} outstanding fetches", outstanding);
        }
    }
}

fn task_error(e: JoinError) -> CrawlError {
    CrawlError::Task(e.to_string())
}

impl Stream for FetchStream {
    type Item = Result<Response>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.tasks.poll_join_next(cx) {
            Poll::Ready(Some(Ok(result))) => Poll::Ready(Some(result)),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(task_error(e)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tasks.len(), Some(self.tasks.len()))
    }
}
