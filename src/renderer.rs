/// Renderer that runs the full pipeline: process, fetch includes, assemble
use crate::assembler::assemble;
use crate::fetcher::{FetchError, IncludeFetcher, RequestTemplate};
use crate::processor::{process_document, url_path, DirectiveWarning};
use crate::resolver::{IncludeObserver, IncludeResolver, LogObserver};
use crate::{SsiError, SsiOptions};
use async_trait::async_trait;
use std::sync::Arc;

/// Output of a render
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub body: Vec<u8>,
    /// Warnings of the top-level document only
    pub warnings: Vec<DirectiveWarning>,
}

/// Directive renderer bound to an include fetcher
///
/// With `nested_includes` enabled (the default) the fetcher is wrapped once,
/// when the renderer is configured, so fetched bodies are themselves
/// rendered. Those nested renders use the bare fetcher, which stops the
/// recursion after one level.
#[derive(Clone)]
pub struct Ssi {
    source: Arc<dyn IncludeFetcher>,
    fetcher: Arc<dyn IncludeFetcher>,
    observer: Arc<dyn IncludeObserver>,
    options: SsiOptions,
}

impl Ssi {
    /// Create a renderer with default options
    pub fn new(fetcher: Arc<dyn IncludeFetcher>) -> Self {
        Ssi {
            source: fetcher.clone(),
            fetcher,
            observer: Arc::new(LogObserver),
            options: SsiOptions::default(),
        }
        .compose()
    }

    /// Create a renderer that splices fetched bodies in unprocessed
    pub fn flat(fetcher: Arc<dyn IncludeFetcher>) -> Self {
        let options = SsiOptions {
            nested_includes: false,
            ..SsiOptions::default()
        };
        Ssi::new(fetcher).with_options(options)
    }

    /// Set the observer notified about failed includes
    pub fn with_observer(mut self, observer: Arc<dyn IncludeObserver>) -> Self {
        self.observer = observer;
        self.compose()
    }

    pub fn with_options(mut self, options: SsiOptions) -> Self {
        self.options = options;
        self.compose()
    }

    pub fn options(&self) -> &SsiOptions {
        &self.options
    }

    fn compose(mut self) -> Self {
        self.fetcher = if self.options.nested_includes {
            let inner = Ssi {
                source: self.source.clone(),
                fetcher: self.source.clone(),
                observer: self.observer.clone(),
                options: SsiOptions {
                    nested_includes: false,
                    ..self.options.clone()
                },
            };
            Arc::new(NestedFetcher { renderer: inner })
        } else {
            self.source.clone()
        };
        self
    }

    /// Render a document served at `base`
    ///
    /// `template` carries the metadata of the request that produced the
    /// document and is handed to every include fetch.
    pub async fn render(
        &self,
        body: &[u8],
        base: &str,
        template: &RequestTemplate,
    ) -> Result<Rendered, SsiError> {
        let processed = process_document(body, base)?;

        let bodies = if processed.has_includes() {
            let resolver = IncludeResolver {
                fetcher: self.fetcher.as_ref(),
                observer: self.observer.as_ref(),
                log_includes: self.options.log_includes,
            };
            resolver.fetch_all(&processed.urls, template).await
        } else {
            Vec::new()
        };

        let body = assemble(&processed.items, &bodies)?;
        Ok(Rendered {
            body,
            warnings: processed.warnings,
        })
    }
}

/// Fetcher that renders what it fetches, using the URL's path as the base
struct NestedFetcher {
    renderer: Ssi,
}

#[async_trait]
impl IncludeFetcher for NestedFetcher {
    async fn fetch(&self, url: &str, template: &RequestTemplate) -> Result<Vec<u8>, FetchError> {
        let raw = self.renderer.fetcher.fetch(url, template).await?;
        let rendered = self
            .renderer
            .render(&raw, url_path(url), template)
            .await
            .map_err(|e| FetchError::Render(format!("{}: {}", url, e)))?;
        Ok(rendered.body)
    }
}
