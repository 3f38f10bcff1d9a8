/// Byte ranges of tokens inside a response body
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Byte range, as ariadne labels expect
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A token or value together with where it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Spanned { value, span }
    }

    /// Wrap a value built by hand rather than read from a body
    pub fn unspanned(value: T) -> Self {
        Spanned {
            value,
            span: Span::new(0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unspanned_covers_nothing() {
        let spanned = Spanned::unspanned('x');
        assert!(spanned.span.range().is_empty());
        assert_eq!(spanned.value, 'x');
    }
}
