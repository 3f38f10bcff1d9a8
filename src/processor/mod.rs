/// Processor module - runs the directive state machine over a token stream
// Sub-modules
mod error;
mod url_impl;

// Implementation modules
mod directive_impl;

// Public exports
pub use error::{DirectiveError, DirectiveWarning};
pub use url_impl::{decode_path, encode_url, resolve_url, url_path};

use crate::chunker::{chunk, Token};
use crate::expression::Context;
use crate::span::Spanned;

/// One piece of pending output
#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    Text(Vec<u8>),
    /// Stands in for the body of `urls[index]` until includes are fetched
    Placeholder(usize),
}

/// Whether content is currently being emitted
///
/// There is exactly one of these per document, not a stack: a nested `if`
/// overwrites the state of the outer one and the first `endif` re-activates
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    Active,
    Suppressed,
}

impl BranchState {
    pub fn is_active(self) -> bool {
        self == BranchState::Active
    }
}

impl From<bool> for BranchState {
    fn from(active: bool) -> Self {
        if active {
            BranchState::Active
        } else {
            BranchState::Suppressed
        }
    }
}

/// Result of processing one document, before includes are fetched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Processed {
    pub items: Vec<OutputItem>,
    pub urls: Vec<String>,
    pub warnings: Vec<DirectiveWarning>,
}

impl Processed {
    pub fn has_includes(&self) -> bool {
        !self.urls.is_empty()
    }
}

/// Directive state machine for a single document
pub struct Processor<'a> {
    pub(super) base: &'a str,
    pub(super) ctx: Context,
    pub(super) state: BranchState,
    pub(super) output: Processed,
}

impl<'a> Processor<'a> {
    /// Create a processor for a document served at `base`
    pub fn new(base: &'a str) -> Self {
        Processor {
            base,
            ctx: Context::new(),
            state: BranchState::Active,
            output: Processed::default(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn state(&self) -> BranchState {
        self.state
    }

    /// Consume the processor, returning the output gathered so far
    pub fn finish(self) -> Processed {
        self.output
    }

    pub(super) fn warn(&mut self, warning: DirectiveWarning) {
        match warning {
            DirectiveWarning::UnknownDirective { .. } => log::debug!("{}", warning),
            _ => log::warn!("{}", warning),
        }
        self.output.warnings.push(warning);
    }
}

/// Run tokens through a fresh processor
pub fn process<I>(tokens: I, base: &str) -> Result<Processed, DirectiveError>
where
    I: IntoIterator<Item = Spanned<Token>>,
{
    let mut processor = Processor::new(base);
    for token in tokens {
        processor.feed(token)?;
    }
    Ok(processor.finish())
}

/// Chunk and process a raw body
pub fn process_document(body: &[u8], base: &str) -> Result<Processed, DirectiveError> {
    let mut chunker = chunk(body);
    let mut processor = Processor::new(base);
    for token in chunker.by_ref() {
        processor.feed(token)?;
    }
    if let Some(span) = chunker.unterminated() {
        processor.warn(DirectiveWarning::Unterminated { span });
    }
    Ok(processor.finish())
}
