//! Values produced by a single fetch

use std::fmt;

/// The content type treated as a parsable webpage
pub const WEBPAGE_CONTENT_TYPE: &str = "text/html";

/// The result of one completed request attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// HTTP method used for the request
    pub method: String,

    /// The requested URL
    pub url: String,

    /// HTTP status code
    pub status: u16,
}

impl FetchResult {
    pub fn new(method: impl Into<String>, url: impl Into<String>, status: u16) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            status,
        }
    }
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} request to {} returned {}",
            self.method, self.url, self.status
        )
    }
}

/// Body of a web resource
///
/// Webpages are decoded as text; every other content type is kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Binary(Vec<u8>),
}

impl Content {
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Text(text) => text.is_empty(),
            Content::Binary(bytes) => bytes.is_empty(),
        }
    }

    /// Returns the content as text, decoding binary content lossily
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Content::Text(text) => std::borrow::Cow::Borrowed(text),
            Content::Binary(bytes) => String::from_utf8_lossy(bytes),
        }
    }
}

/// The metadata and content of a web resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebResource {
    pub content_type: String,
    pub content: Content,
}

impl WebResource {
    pub fn new(content_type: impl Into<String>, content: Content) -> Self {
        Self {
            content_type: content_type.into(),
            content,
        }
    }

    /// Creates a `text/html` resource
    pub fn webpage(html: impl Into<String>) -> Self {
        Self::new(WEBPAGE_CONTENT_TYPE, Content::Text(html.into()))
    }
}

/// The result of a request and its associated resource, if one was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub fetch: FetchResult,
    pub web_resource: Option<WebResource>,
}

impl Response {
    pub fn new(fetch: FetchResult, web_resource: Option<WebResource>) -> Self {
        Self {
            fetch,
            web_resource,
        }
    }

    /// Checks if the response carries non-empty content that links can be extracted from
    pub fn is_parsable(&self) -> bool {
        self.web_resource
            .as_ref()
            .is_some_and(|resource| !resource.content.is_empty())
    }
}

/// Checks whether a content type denotes a webpage
pub fn is_webpage(content_type: &str) -> bool {
    content_type == WEBPAGE_CONTENT_TYPE
}
