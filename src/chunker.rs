/// Chunker that splits a raw body into literal text and directive tokens
use crate::command::{parse_command, Arguments};
use crate::span::{Span, Spanned};

pub const OPEN_MARKER: &[u8] = b"<!--#";
pub const CLOSE_MARKER: &[u8] = b"-->";

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Raw bytes copied from the body
    Literal(Vec<u8>),
    /// A `<!--# name key="value" -->` comment
    Directive { name: String, args: Arguments },
}

impl Token {
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        Token::Literal(bytes.into())
    }

    pub fn directive<K, V>(name: impl Into<String>, args: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Token::Directive {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }
}

/// Lazy token stream over a body
///
/// Marker search runs on raw bytes; only the text inside a directive is
/// decoded, and invalid UTF-8 there is replaced rather than rejected.
pub struct Chunker<'a> {
    body: &'a [u8],
    pos: usize,
    done: bool,
    unterminated: Option<Span>,
}

impl<'a> Chunker<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Chunker {
            body,
            pos: 0,
            done: false,
            unterminated: None,
        }
    }

    /// Span of the directive that was opened but never closed, if the stream
    /// stopped because of one. Everything from that point on was dropped.
    pub fn unterminated(&self) -> Option<Span> {
        self.unterminated
    }
}

impl<'a> Iterator for Chunker<'a> {
    type Item = Spanned<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let rest = &self.body[self.pos..];
        let open = match find(rest, OPEN_MARKER) {
            Some(offset) => self.pos + offset,
            None => {
                // The tail is always emitted, even when empty
                self.done = true;
                let span = Span::new(self.pos, self.body.len());
                self.pos = self.body.len();
                return Some(Spanned::new(Token::Literal(rest.to_vec()), span));
            }
        };

        if open > self.pos {
            let span = Span::new(self.pos, open);
            let literal = self.body[self.pos..open].to_vec();
            self.pos = open;
            return Some(Spanned::new(Token::Literal(literal), span));
        }

        let inner_start = open + OPEN_MARKER.len();
        let inner_end = match find(&self.body[inner_start..], CLOSE_MARKER) {
            Some(offset) => inner_start + offset,
            None => {
                self.done = true;
                self.unterminated = Some(Span::new(open, self.body.len()));
                return None;
            }
        };

        let text = String::from_utf8_lossy(self.body[inner_start..inner_end].trim_ascii());
        let (name, args) = parse_command(&text);
        let end = inner_end + CLOSE_MARKER.len();
        self.pos = end;
        Some(Spanned::new(
            Token::Directive { name, args },
            Span::new(open, end),
        ))
    }
}

/// Tokenize a body
pub fn chunk(body: &[u8]) -> Chunker<'_> {
    Chunker::new(body)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
