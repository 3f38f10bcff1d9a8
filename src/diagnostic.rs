/// Diagnostic reporting using ariadne for readable directive errors
use crate::processor::{DirectiveError, DirectiveWarning};
use crate::span::Span;
use crate::SsiError;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::ops::Range;

/// Convert a span to a range for ariadne
fn span_to_range(span: Span) -> Range<usize> {
    span.range()
}

/// Report a directive warning
pub fn report_warning(source_name: &str, source: &str, warning: &DirectiveWarning) -> String {
    let mut output = Vec::new();

    let report = match warning {
        DirectiveWarning::Unterminated { span } => {
            Report::build(ReportKind::Warning, source_name, span.start)
                .with_message("Unterminated directive")
                .with_label(
                    Label::new((source_name, span_to_range(*span)))
                        .with_message("this directive is never closed, everything from here on is dropped")
                        .with_color(Color::Yellow),
                )
                .with_help("Close the directive with '-->'")
                .finish()
        }
        DirectiveWarning::MissingArgument {
            directive,
            argument,
            span,
        } => Report::build(ReportKind::Warning, source_name, span.start)
            .with_message(format!("Missing argument '{}'", argument))
            .with_label(
                Label::new((source_name, span_to_range(*span)))
                    .with_message(format!("'{}' needs {}=\"...\"; directive skipped", directive, argument))
                    .with_color(Color::Yellow),
            )
            .finish(),
        DirectiveWarning::UnknownDirective { name, span } => {
            Report::build(ReportKind::Warning, source_name, span.start)
                .with_message(format!("Unknown directive: '{}'", name))
                .with_label(
                    Label::new((source_name, span_to_range(*span)))
                        .with_message("this directive is ignored")
                        .with_color(Color::Yellow),
                )
                .with_note("Supported directives: if, elif, else, endif, set, echo, include")
                .finish()
        }
    };

    report
        .write((source_name, Source::from(source)), &mut output)
        .expect("Failed to write diagnostic");

    String::from_utf8(output).expect("Invalid UTF-8 in diagnostic output")
}

/// Report a directive error
pub fn report_directive_error(source_name: &str, source: &str, error: &DirectiveError) -> String {
    let mut output = Vec::new();

    let report = match error {
        DirectiveError::InvalidExpression { expr, reason, span } => {
            Report::build(ReportKind::Error, source_name, span.start)
                .with_message(format!("Invalid expression: '{}'", expr))
                .with_label(
                    Label::new((source_name, span_to_range(*span)))
                        .with_message(reason.to_string())
                        .with_color(Color::Red),
                )
                .with_help("Use '$var', 'var = value', 'var != value' or 'var ='")
                .finish()
        }
    };

    report
        .write((source_name, Source::from(source)), &mut output)
        .expect("Failed to write diagnostic");

    String::from_utf8(output).expect("Invalid UTF-8 in diagnostic output")
}

/// Combined error reporting for any render error
///
/// Assembly errors have no position in the document and are reported as plain text.
pub fn report_ssi_error(source_name: &str, source: &str, error: &SsiError) -> String {
    match error {
        SsiError::Directive(e) => report_directive_error(source_name, source, e),
        SsiError::Assembly(e) => format!("Error: {} in {}\n", e, source_name),
    }
}
