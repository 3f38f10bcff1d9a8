/// Include resolution: fetches every include URL of a document in order
use crate::fetcher::{FetchError, IncludeFetcher, RequestTemplate};
use std::time::Instant;

/// Receives include failures
///
/// A failed include is replaced with an empty body so the document can
/// still be assembled; this is the only place the failure becomes visible.
pub trait IncludeObserver: Send + Sync {
    fn include_failed(&self, url: &str, error: &FetchError);
}

/// Observer that reports failures through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl IncludeObserver for LogObserver {
    fn include_failed(&self, url: &str, error: &FetchError) {
        log::error!("SSI include {:?} failed: {}", url, error);
    }
}

/// Fetches include bodies through a fetcher, one URL at a time
pub struct IncludeResolver<'a> {
    pub fetcher: &'a dyn IncludeFetcher,
    pub observer: &'a dyn IncludeObserver,
    pub log_includes: bool,
}

impl<'a> IncludeResolver<'a> {
    /// Fetch all URLs, returning bodies index-aligned with `urls`
    ///
    /// Never fails: a URL whose fetch errors contributes an empty body.
    pub async fn fetch_all(&self, urls: &[String], template: &RequestTemplate) -> Vec<Vec<u8>> {
        let mut bodies = Vec::with_capacity(urls.len());

        for url in urls {
            if self.log_includes {
                log::info!("SSI include {:?}", url);
            }
            let started = Instant::now();

            match self.fetcher.fetch(url, template).await {
                Ok(body) => {
                    if self.log_includes {
                        log::info!(
                            "SSI include {:?} done, {} bytes in {:.3}ms",
                            url,
                            body.len(),
                            started.elapsed().as_secs_f64() * 1000.0
                        );
                    }
                    bodies.push(body);
                }
                Err(e) => {
                    self.observer.include_failed(url, &e);
                    bodies.push(Vec::new());
                }
            }
        }

        bodies
    }
}
