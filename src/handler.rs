/// HTTP handler seam: run SSI over the responses of another handler
use crate::fetcher::{FetchError, IncludeFetcher, RequestTemplate};
use crate::processor::decode_path;
use crate::renderer::Ssi;
use crate::resolver::IncludeObserver;
use crate::SsiOptions;
use async_trait::async_trait;
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, HeaderValue, Request, Response};
use std::sync::Arc;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Async request handler over fully buffered bodies
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, BoxError>;
}

/// Fetcher that issues include sub-requests against a handler
///
/// The response status is not checked: whatever body the handler returns is
/// spliced in.
pub struct HandlerFetcher {
    handler: Arc<dyn Handler>,
}

impl HandlerFetcher {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        HandlerFetcher { handler }
    }
}

#[async_trait]
impl IncludeFetcher for HandlerFetcher {
    async fn fetch(&self, url: &str, template: &RequestTemplate) -> Result<Vec<u8>, FetchError> {
        let request = template.build(url)?;
        let response = self
            .handler
            .call(request)
            .await
            .map_err(|e| FetchError::Handler(format!("{}: {}", url, e)))?;
        log::debug!("SSI include {:?} -> {}", url, response.status());
        Ok(response.into_body())
    }
}

/// Handler that renders SSI directives in the responses of `upstream`
///
/// Includes are requested from `downstream`, which defaults to `upstream`.
pub struct SsiHandler {
    upstream: Arc<dyn Handler>,
    renderer: Ssi,
}

impl SsiHandler {
    pub fn new(upstream: Arc<dyn Handler>) -> Self {
        Self::with_downstream(upstream.clone(), upstream)
    }

    pub fn with_downstream(upstream: Arc<dyn Handler>, downstream: Arc<dyn Handler>) -> Self {
        SsiHandler {
            upstream,
            renderer: Ssi::new(Arc::new(HandlerFetcher::new(downstream))),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn IncludeObserver>) -> Self {
        self.renderer = self.renderer.with_observer(observer);
        self
    }

    pub fn with_options(mut self, options: SsiOptions) -> Self {
        self.renderer = self.renderer.with_options(options);
        self
    }
}

#[async_trait]
impl Handler for SsiHandler {
    async fn call(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, BoxError> {
        let template = RequestTemplate::from_request(&request);
        let base = match request.uri().path() {
            "" => "/".to_string(),
            path => decode_path(path),
        };

        let response = self.upstream.call(request).await?;
        let (mut parts, body) = response.into_parts();

        let rendered = self.renderer.render(&body, &base, &template).await?;
        set_content_length(&mut parts.headers, rendered.body.len());
        Ok(Response::from_parts(parts, rendered.body))
    }
}

/// Replace any `Content-Length` headers with one for `len` bytes
pub fn set_content_length(headers: &mut HeaderMap, len: usize) {
    headers.remove(CONTENT_LENGTH);
    headers.append(CONTENT_LENGTH, HeaderValue::from(len));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;

    #[test]
    fn test_set_content_length_replaces_all() {
        let mut headers = HeaderMap::new();
        headers.append(CONTENT_LENGTH, HeaderValue::from(1usize));
        headers.append(CONTENT_LENGTH, HeaderValue::from(2usize));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));

        set_content_length(&mut headers, 42);
        let values: Vec<_> = headers.get_all(CONTENT_LENGTH).iter().collect();
        assert_eq!(values, vec![&HeaderValue::from(42usize)]);
        assert_eq!(headers[CONTENT_TYPE], "text/html");
    }

    struct Fixed(&'static str);

    #[async_trait]
    impl Handler for Fixed {
        async fn call(&self, _request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, BoxError> {
            Ok(Response::new(self.0.as_bytes().to_vec()))
        }
    }

    #[tokio::test]
    async fn test_handler_fetcher_returns_body() {
        let fetcher = HandlerFetcher::new(Arc::new(Fixed("fragment")));
        let body = fetcher.fetch("/x", &RequestTemplate::new()).await.unwrap();
        assert_eq!(body, b"fragment");
    }

    struct EchoUri;

    #[async_trait]
    impl Handler for EchoUri {
        async fn call(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, BoxError> {
            Ok(Response::new(request.uri().to_string().into_bytes()))
        }
    }

    #[tokio::test]
    async fn test_handler_fetcher_encodes_url() {
        let fetcher = HandlerFetcher::new(Arc::new(EchoUri));
        let body = fetcher.fetch("/a b.html", &RequestTemplate::new()).await.unwrap();
        assert_eq!(body, b"/a%20b.html");
    }
}
