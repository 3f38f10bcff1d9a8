//! Directive handling for the Processor
//!
//! Conditionals are handled first and regardless of state. Everything else
//! only runs while the current branch is active.

use crate::chunker::Token;
use crate::command::Arguments;
use crate::expression::{evaluate_condition, expand};
use crate::span::{Span, Spanned};

use super::{resolve_url, BranchState, DirectiveError, DirectiveWarning, OutputItem, Processor};

impl<'a> Processor<'a> {
    /// Process one token
    pub fn feed(&mut self, token: Spanned<Token>) -> Result<(), DirectiveError> {
        let Spanned { value, span } = token;
        match value {
            Token::Literal(bytes) => {
                if self.state.is_active() {
                    self.output.items.push(OutputItem::Text(bytes));
                }
                Ok(())
            }
            Token::Directive { name, args } => self.directive(&name, &args, span),
        }
    }

    fn directive(&mut self, name: &str, args: &Arguments, span: Span) -> Result<(), DirectiveError> {
        match name {
            "if" => {
                self.state = BranchState::from(self.condition(args, span)?);
                log::debug!("if at {} -> {:?}", span.start, self.state);
                return Ok(());
            }
            "elif" => {
                if !self.state.is_active() {
                    self.state = BranchState::from(self.condition(args, span)?);
                    log::debug!("elif at {} -> {:?}", span.start, self.state);
                }
                return Ok(());
            }
            "else" | "endif" => {
                self.state = BranchState::Active;
                return Ok(());
            }
            _ => {}
        }

        if !self.state.is_active() {
            return Ok(());
        }

        match name {
            "set" => self.set(args, span),
            "echo" => {
                let value = self.ctx.get(args.get("var").unwrap_or(""));
                self.output.items.push(OutputItem::Text(value.as_bytes().to_vec()));
            }
            "include" => self.include(args, span),
            _ => self.warn(DirectiveWarning::UnknownDirective {
                name: name.to_string(),
                span,
            }),
        }
        Ok(())
    }

    fn condition(&self, args: &Arguments, span: Span) -> Result<bool, DirectiveError> {
        let expr = args.get("expr").unwrap_or("");
        evaluate_condition(&self.ctx, expr).map_err(|reason| DirectiveError::InvalidExpression {
            expr: expr.to_string(),
            reason,
            span,
        })
    }

    fn set(&mut self, args: &Arguments, span: Span) {
        let Some(var) = args.get("var") else {
            self.missing_argument("set", "var", span);
            return;
        };
        let value = expand(&self.ctx, args.get("value").unwrap_or(""));
        self.ctx.set(var, value);
    }

    fn include(&mut self, args: &Arguments, span: Span) {
        let Some(target) = args.get("virtual") else {
            self.missing_argument("include", "virtual", span);
            return;
        };
        let target = expand(&self.ctx, target);
        let url = resolve_url(self.base, &target).unwrap_or_else(|e| {
            log::warn!(
                "Cannot resolve include '{}' against '{}': {}",
                target,
                self.base,
                e
            );
            target.clone()
        });

        self.output
            .items
            .push(OutputItem::Placeholder(self.output.urls.len()));
        self.output.urls.push(url);
    }

    fn missing_argument(&mut self, directive: &str, argument: &str, span: Span) {
        self.warn(DirectiveWarning::MissingArgument {
            directive: directive.to_string(),
            argument: argument.to_string(),
            span,
        });
    }
}
