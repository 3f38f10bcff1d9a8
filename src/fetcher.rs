/// Include fetching trait and implementations
///
/// This module provides an async trait for fetching the bodies of virtual
/// includes, with implementations for in-memory, filesystem and chained
/// lookups. Fetching through an HTTP handler lives in [`crate::handler`].
use async_trait::async_trait;
use http::header::{HeaderName, CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use http::uri::{Authority, Scheme};
use http::{HeaderMap, Method, Request, Uri, Version};
use std::collections::HashMap;
#[cfg(feature = "tokio-runtime")]
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::processor::{encode_url, url_path};

/// Error types for include fetching
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    NotFound(String),
    IoError(String),
    InvalidUrl(String),
    Handler(String),
    /// The fetched body could not be processed as a nested document
    Render(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::NotFound(url) => write!(f, "Include not found: {}", url),
            FetchError::IoError(msg) => write!(f, "IO error: {}", msg),
            FetchError::InvalidUrl(url) => write!(f, "Invalid include URL: {}", url),
            FetchError::Handler(msg) => write!(f, "Handler error: {}", msg),
            FetchError::Render(msg) => write!(f, "Nested include error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Metadata of the original request carried over to include sub-requests
///
/// Keeps the HTTP version, the URI scheme and authority, and every header
/// except the ones describing the original request body.
#[derive(Debug, Clone, Default)]
pub struct RequestTemplate {
    version: Version,
    scheme: Option<Scheme>,
    authority: Option<Authority>,
    headers: HeaderMap,
}

impl RequestTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_request<B>(request: &Request<B>) -> Self {
        let headers = request
            .headers()
            .iter()
            .filter(|(name, _)| is_forwarded(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        RequestTemplate {
            version: request.version(),
            scheme: request.uri().scheme().cloned(),
            authority: request.uri().authority().cloned(),
            headers,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Build a body-less `GET` for a resolved include URL
    ///
    /// The URL is percent-encoded on the way into the request URI.
    pub fn build(&self, url: &str) -> Result<Request<Vec<u8>>, FetchError> {
        let invalid = |e: http::Error| FetchError::InvalidUrl(format!("{} ({})", url, e));

        let mut uri = Uri::builder();
        if let (Some(scheme), Some(authority)) = (&self.scheme, &self.authority) {
            uri = uri.scheme(scheme.clone()).authority(authority.clone());
        }
        let uri = uri.path_and_query(encode_url(url)).build().map_err(invalid)?;

        let mut request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .version(self.version)
            .body(Vec::new())
            .map_err(invalid)?;
        *request.headers_mut() = self.headers.clone();
        Ok(request)
    }
}

fn is_forwarded(name: &HeaderName) -> bool {
    ![CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING].contains(name)
}

/// Async trait for fetching include bodies
///
/// Implementations receive an already resolved URL (`path` or `path?query`)
/// and the template of the request that triggered the include.
#[async_trait]
pub trait IncludeFetcher: Send + Sync {
    /// Fetch the body for `url`
    async fn fetch(&self, url: &str, template: &RequestTemplate) -> Result<Vec<u8>, FetchError>;
}

/// Filesystem-based fetcher
///
/// Serves the path component of an include URL from a document root. Paths
/// containing `..` segments (split on `/` or `\`) are rejected.
///
/// Only available with the `tokio-runtime` feature (not on WASM).
#[cfg(feature = "tokio-runtime")]
pub struct FolderFetcher {
    root: PathBuf,
}

#[cfg(feature = "tokio-runtime")]
impl FolderFetcher {
    /// Create a new FolderFetcher serving files below `root`
    ///
    /// # Example
    /// ```no_run
    /// use ssi_interpreter::fetcher::FolderFetcher;
    /// use std::path::PathBuf;
    ///
    /// let fetcher = FolderFetcher::new(PathBuf::from("./public"));
    /// ```
    pub fn new(root: PathBuf) -> Self {
        FolderFetcher { root }
    }
}

#[cfg(feature = "tokio-runtime")]
#[async_trait]
impl IncludeFetcher for FolderFetcher {
    async fn fetch(&self, url: &str, _template: &RequestTemplate) -> Result<Vec<u8>, FetchError> {
        let path = url_path(url);
        if path.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let relative = path.trim_start_matches('/');
        if relative.is_empty() || relative.ends_with('/') {
            return Err(FetchError::NotFound(url.to_string()));
        }

        match tokio::fs::read(self.root.join(relative)).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(url.to_string()))
            }
            Err(e) => Err(FetchError::IoError(format!("{}: {}", url, e))),
        }
    }
}

/// In-memory include store
///
/// Looks up the full URL first and falls back to its path, so an entry for
/// `/page.html` also answers `/page.html?x=1`. Useful for testing and for
/// serving a fixed set of fragments.
#[derive(Clone, Default)]
pub struct InMemoryFetcher {
    bodies: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryFetcher {
    /// Create a new empty InMemoryFetcher
    ///
    /// # Example
    /// ```
    /// use ssi_interpreter::fetcher::InMemoryFetcher;
    ///
    /// let fetcher = InMemoryFetcher::new();
    /// fetcher.add("/footer.html", "<footer>hi</footer>");
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        let mut bodies = self.bodies.write().unwrap_or_else(PoisonError::into_inner);
        bodies.insert(url.into(), body.into());
    }

    /// Returns `true` if the entry existed
    pub fn remove(&self, url: &str) -> bool {
        let mut bodies = self.bodies.write().unwrap_or_else(PoisonError::into_inner);
        bodies.remove(url).is_some()
    }

    pub fn clear(&self) {
        let mut bodies = self.bodies.write().unwrap_or_else(PoisonError::into_inner);
        bodies.clear();
    }

    pub fn contains(&self, url: &str) -> bool {
        let bodies = self.bodies.read().unwrap_or_else(PoisonError::into_inner);
        bodies.contains_key(url)
    }
}

#[async_trait]
impl IncludeFetcher for InMemoryFetcher {
    async fn fetch(&self, url: &str, _template: &RequestTemplate) -> Result<Vec<u8>, FetchError> {
        let bodies = self.bodies.read().unwrap_or_else(PoisonError::into_inner);
        bodies
            .get(url)
            .or_else(|| bodies.get(url_path(url)))
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

/// Chain fetcher that tries multiple fetchers in sequence
///
/// A fetcher answering `NotFound` passes the URL on to the next one; any
/// other error stops the chain.
#[derive(Clone, Default)]
pub struct ChainFetcher {
    fetchers: Vec<Arc<dyn IncludeFetcher>>,
}

impl ChainFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fetcher to the chain
    ///
    /// Fetchers are tried in the order they are added.
    ///
    /// # Example
    /// ```
    /// use ssi_interpreter::fetcher::{ChainFetcher, InMemoryFetcher};
    /// use std::sync::Arc;
    ///
    /// let chain = ChainFetcher::new()
    ///     .with_fetcher(Arc::new(InMemoryFetcher::new()));
    /// ```
    pub fn with_fetcher(mut self, fetcher: Arc<dyn IncludeFetcher>) -> Self {
        self.fetchers.push(fetcher);
        self
    }

    pub fn from_fetchers(fetchers: Vec<Arc<dyn IncludeFetcher>>) -> Self {
        ChainFetcher { fetchers }
    }
}

#[async_trait]
impl IncludeFetcher for ChainFetcher {
    async fn fetch(&self, url: &str, template: &RequestTemplate) -> Result<Vec<u8>, FetchError> {
        for fetcher in &self.fetchers {
            match fetcher.fetch(url, template).await {
                Ok(body) => return Ok(body),
                Err(FetchError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(FetchError::NotFound(url.to_string()))
    }
}
