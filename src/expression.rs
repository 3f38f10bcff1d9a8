/// Variable expansion and conditional expressions
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // The leading group consumes the character before `$`, so `$a$b` only
    // expands `$a`: the second `$` has no unconsumed character in front of it.
    static ref VARIABLE_RE: Regex =
        Regex::new(r"(^|[^\\])\$\{?([A-Za-z0-9_]+)\}?").unwrap();
}

/// Variables bound by `set` while processing a single document
///
/// Kept in the order they were first set; setting a variable again replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    variables: Vec<(String, String)>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            variables: Vec::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.variables.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.variables.push((name, value)),
        }
    }

    /// Value of `name`, or the empty string when unset
    pub fn get(&self, name: &str) -> &str {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (name, value) in iter {
            ctx.set(name, value);
        }
        ctx
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Only one, two or three whitespace-separated tokens are understood
    InvalidArity(usize),
    UnknownOperator(String),
}

impl std::fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpressionError::InvalidArity(count) => write!(
                f,
                "expected 1 to 3 tokens, found {}",
                count
            ),
            ExpressionError::UnknownOperator(op) => {
                write!(f, "unknown operator '{}', expected '=' or '!='", op)
            }
        }
    }
}

impl std::error::Error for ExpressionError {}

/// Replace `$name` and `${name}` with their values, then unescape `\$`
pub fn expand(ctx: &Context, input: &str) -> String {
    let substituted = VARIABLE_RE.replace_all(input, |caps: &Captures| {
        format!("{}{}", &caps[1], ctx.get(&caps[2]))
    });
    substituted.replace(r"\$", "$")
}

/// Evaluate an `if`/`elif` expression
///
/// Supported forms are `$var` (non-empty test), `var = value`,
/// `var != value` and `var =` (compares against the empty string). Only the
/// left operand is expanded.
pub fn evaluate_condition(ctx: &Context, expr: &str) -> Result<bool, ExpressionError> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    let (left, op, right) = match parts.as_slice() {
        [single] => return Ok(!expand(ctx, single).is_empty()),
        [left, op] => (*left, *op, ""),
        [left, op, right] => (*left, *op, *right),
        _ => return Err(ExpressionError::InvalidArity(parts.len())),
    };

    let left = expand(ctx, left);
    match op {
        "=" => Ok(left == right),
        "!=" => Ok(left != right),
        other => Err(ExpressionError::UnknownOperator(other.to_string())),
    }
}
