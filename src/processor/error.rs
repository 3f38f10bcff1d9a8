use crate::expression::ExpressionError;
use crate::span::Span;

/// Errors that stop a document from being processed
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveError {
    InvalidExpression {
        expr: String,
        reason: ExpressionError,
        span: Span,
    },
}

impl std::fmt::Display for DirectiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectiveError::InvalidExpression { expr, reason, span } => write!(
                f,
                "Invalid expression '{}': {} at position {}",
                expr, reason, span.start
            ),
        }
    }
}

impl std::error::Error for DirectiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DirectiveError::InvalidExpression { reason, .. } => Some(reason),
        }
    }
}

impl DirectiveError {
    /// Get the span associated with this error
    pub fn span(&self) -> Span {
        match self {
            DirectiveError::InvalidExpression { span, .. } => *span,
        }
    }
}

/// Problems in a document that do not stop processing
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveWarning {
    /// A directive was opened and never closed; the rest of the body was dropped
    Unterminated { span: Span },
    MissingArgument {
        directive: String,
        argument: String,
        span: Span,
    },
    UnknownDirective { name: String, span: Span },
}

impl std::fmt::Display for DirectiveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectiveWarning::Unterminated { span } => write!(
                f,
                "Unterminated directive at position {}, remaining content dropped",
                span.start
            ),
            DirectiveWarning::MissingArgument {
                directive,
                argument,
                span,
            } => write!(
                f,
                "Directive '{}' is missing argument '{}' at position {}",
                directive, argument, span.start
            ),
            DirectiveWarning::UnknownDirective { name, span } => {
                write!(f, "Unknown directive '{}' at position {}", name, span.start)
            }
        }
    }
}

impl DirectiveWarning {
    /// Get the span associated with this warning
    pub fn span(&self) -> Span {
        match self {
            DirectiveWarning::Unterminated { span } => *span,
            DirectiveWarning::MissingArgument { span, .. } => *span,
            DirectiveWarning::UnknownDirective { span, .. } => *span,
        }
    }
}
