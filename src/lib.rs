/// SSI Interpreter - Server Side Includes for HTTP responses
///
/// This library rewrites `<!--# ... -->` directives embedded in a response
/// body: conditionals (`if`/`elif`/`else`/`endif`), variables (`set`/`echo`)
/// and virtual includes fetched through a pluggable fetcher.
///
/// # Example
///
/// ```
/// # tokio_test::block_on(async {
/// use ssi_interpreter::fetcher::InMemoryFetcher;
/// use ssi_interpreter::render;
/// use std::sync::Arc;
///
/// let fetcher = InMemoryFetcher::new();
/// fetcher.add("/footer.html", "bye");
///
/// let body = br#"<!--# set var="who" value="world" -->hello <!--# echo var="who" -->, <!--# include virtual="footer.html" -->"#;
/// let result = render(body, "/index.html", Arc::new(fetcher)).await.unwrap();
/// assert_eq!(result, b"hello world, bye");
/// # });
/// ```
pub mod assembler;
pub mod chunker;
pub mod command;
pub mod diagnostic;
pub mod expression;
pub mod fetcher;
pub mod handler;
pub mod processor;
pub mod renderer;
pub mod resolver;
pub mod span;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Re-export main types for convenience
pub use assembler::AssemblyError;
pub use chunker::{chunk, Token};
pub use expression::{evaluate_condition, expand, Context, ExpressionError};
pub use fetcher::{FetchError, IncludeFetcher, RequestTemplate};
pub use handler::{Handler, SsiHandler};
pub use processor::{process, process_document, DirectiveError, DirectiveWarning, OutputItem};
pub use renderer::{Rendered, Ssi};
pub use resolver::{IncludeObserver, LogObserver};

/// Combined error type for rendering a document
#[derive(Debug, Clone, PartialEq)]
pub enum SsiError {
    Directive(DirectiveError),
    Assembly(AssemblyError),
}

impl std::fmt::Display for SsiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SsiError::Directive(e) => write!(f, "Directive error: {}", e),
            SsiError::Assembly(e) => write!(f, "Assembly error: {}", e),
        }
    }
}

impl std::error::Error for SsiError {}

impl From<DirectiveError> for SsiError {
    fn from(e: DirectiveError) -> Self {
        SsiError::Directive(e)
    }
}

impl From<AssemblyError> for SsiError {
    fn from(e: AssemblyError) -> Self {
        SsiError::Assembly(e)
    }
}

/// Options for rendering documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsiOptions {
    /// Log every include at `info` level, with timing
    pub log_includes: bool,
    /// Render fetched bodies too (one level deep)
    pub nested_includes: bool,
}

impl Default for SsiOptions {
    fn default() -> Self {
        SsiOptions {
            log_includes: true,
            nested_includes: true,
        }
    }
}

/// Render a document served at `base`, with default options
///
/// # Example
/// ```
/// # tokio_test::block_on(async {
/// use ssi_interpreter::fetcher::InMemoryFetcher;
/// use ssi_interpreter::render;
/// use std::sync::Arc;
///
/// let body = br#"<!--# if expr="$x" -->yes<!--# else -->no<!--# endif -->"#;
/// let result = render(body, "/", Arc::new(InMemoryFetcher::new())).await.unwrap();
/// assert_eq!(result, b"no");
/// # });
/// ```
pub async fn render(
    body: &[u8],
    base: &str,
    fetcher: Arc<dyn IncludeFetcher>,
) -> Result<Vec<u8>, SsiError> {
    let rendered = Ssi::new(fetcher)
        .render(body, base, &RequestTemplate::new())
        .await?;
    Ok(rendered.body)
}

/// Render a UTF-8 document, returning text
///
/// Invalid UTF-8 in included bodies is replaced.
pub async fn render_str(
    body: &str,
    base: &str,
    fetcher: Arc<dyn IncludeFetcher>,
) -> Result<String, SsiError> {
    let rendered = render(body.as_bytes(), base, fetcher).await?;
    Ok(String::from_utf8(rendered)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}
