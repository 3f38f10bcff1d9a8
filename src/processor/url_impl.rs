//! Resolution of include targets against the including document's path
//!
//! Resolved URLs are kept as written: spaces, backslashes, `%` and non-ASCII
//! characters survive resolution unencoded. Encoding happens only when a
//! sub-request is built, see [`encode_url`].

use lazy_static::lazy_static;
use pct_str::{Encoder, PctStr, PctString};
use url::Url;

lazy_static! {
    // Only the path and query of the joined URL are kept, so the host is a placeholder
    static ref ORIGIN: Url = Url::parse("http://localhost/").unwrap();
}

/// Characters the URL parser would rewrite or strip
struct Verbatim;

impl Encoder for Verbatim {
    fn encode(&self, c: char) -> bool {
        matches!(c, '%' | '\\' | ' ') || c.is_ascii_control() || !c.is_ascii()
    }
}

/// Characters not allowed in a request path
struct PathUnsafe;

impl Encoder for PathUnsafe {
    fn encode(&self, c: char) -> bool {
        matches!(
            c,
            '%' | '\\' | ' ' | '"' | '#' | '<' | '>' | '`' | '{' | '}' | '|' | '^' | '[' | ']'
        ) || c.is_ascii_control()
            || !c.is_ascii()
    }
}

fn decode(encoded: &str) -> String {
    PctStr::new(encoded)
        .map(|pct| pct.decode())
        .unwrap_or_else(|_| encoded.to_string())
}

/// Resolve `target` relative to the document path `base`
///
/// Follows RFC 3986 reference resolution, so `bar.html` against `/dir/page`
/// becomes `/dir/bar.html` and an absolute path replaces the base entirely.
/// The result is `path` or `path?query`; scheme, host and fragment of the
/// target are discarded.
pub fn resolve_url(base: &str, target: &str) -> Result<String, url::ParseError> {
    let base = if base.is_empty() { "/" } else { base };
    let base = PctString::encode(base.chars(), Verbatim).to_string();
    let target = PctString::encode(target.chars(), Verbatim).to_string();
    let resolved = ORIGIN.join(&base)?.join(&target)?;

    let mut out = decode(resolved.path());
    if let Some(query) = resolved.query() {
        out.push('?');
        out.push_str(&decode(query));
    }
    Ok(out)
}

/// Path component of a resolved URL (everything before `?`)
pub fn url_path(url: &str) -> &str {
    url.split_once('?').map(|(path, _)| path).unwrap_or(url)
}

/// Percent-encode a resolved URL for use as a request target
pub fn encode_url(url: &str) -> String {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };

    let mut out = PctString::encode(path.chars(), PathUnsafe).to_string();
    if let Some(query) = query {
        out.push('?');
        // Escapes already in the query are kept
        let parts: Vec<String> = query
            .split('%')
            .map(|part| PctString::encode(part.chars(), PathUnsafe).to_string())
            .collect();
        out.push_str(&parts.join("%"));
    }
    out
}

/// Decode the path of an incoming request, so it can serve as a base
pub fn decode_path(path: &str) -> String {
    decode(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_root() {
        assert_eq!(resolve_url("/", "bar.html").unwrap(), "/bar.html");
    }

    #[test]
    fn test_relative_to_nested_document() {
        assert_eq!(
            resolve_url("/docs/index.html", "part.html").unwrap(),
            "/docs/part.html"
        );
        assert_eq!(
            resolve_url("/docs/index.html", "../top.html").unwrap(),
            "/top.html"
        );
    }

    #[test]
    fn test_absolute_path_keeps_query() {
        assert_eq!(
            resolve_url("/docs/index.html", "/foo?bar=baz").unwrap(),
            "/foo?bar=baz"
        );
    }

    #[test]
    fn test_empty_base_is_root() {
        assert_eq!(resolve_url("", "a.html").unwrap(), "/a.html");
    }

    #[test]
    fn test_full_url_keeps_only_path() {
        assert_eq!(
            resolve_url("/", "http://example.com/x?y=1#frag").unwrap(),
            "/x?y=1"
        );
    }

    #[test]
    fn test_targets_are_not_encoded() {
        assert_eq!(resolve_url("/", "/a b.html").unwrap(), "/a b.html");
        assert_eq!(resolve_url("/", "/foo?bar=a b").unwrap(), "/foo?bar=a b");
        assert_eq!(resolve_url("/", "/café.html").unwrap(), "/café.html");
        assert_eq!(resolve_url("/", "a%20b.html").unwrap(), "/a%20b.html");
    }

    #[test]
    fn test_backslash_is_kept() {
        assert_eq!(resolve_url("/", r"a\b.html").unwrap(), r"/a\b.html");
    }

    #[test]
    fn test_base_with_space() {
        assert_eq!(
            resolve_url("/my dir/index.shtml", "../up/x.html").unwrap(),
            "/up/x.html"
        );
        assert_eq!(
            resolve_url("/my dir/index.shtml", "x y.html").unwrap(),
            "/my dir/x y.html"
        );
    }

    #[test]
    fn test_encoded_dots_are_not_segments() {
        assert_eq!(resolve_url("/a/b.html", "%2e%2e/c").unwrap(), "/a/%2e%2e/c");
    }

    #[test]
    fn test_url_path() {
        assert_eq!(url_path("/a/b?c=d"), "/a/b");
        assert_eq!(url_path("/a/b"), "/a/b");
    }

    #[test]
    fn test_encode_url() {
        assert_eq!(encode_url("/a b.html"), "/a%20b.html");
        assert_eq!(encode_url("/café.html"), "/caf%C3%A9.html");
        assert_eq!(encode_url(r"/a\b"), "/a%5Cb");
        assert_eq!(encode_url("/100%"), "/100%25");
        assert_eq!(encode_url("/q?x=a b&y=1%202"), "/q?x=a%20b&y=1%202");
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/my%20dir/caf%C3%A9"), "/my dir/café");
        assert_eq!(decode_path("/plain"), "/plain");
    }
}
