/// Tests for virtual includes
use ssi_interpreter::fetcher::{FetchError, InMemoryFetcher};
use ssi_interpreter::{process_document, IncludeObserver, OutputItem, RequestTemplate, Ssi};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingObserver {
    failures: Mutex<Vec<String>>,
}

impl IncludeObserver for RecordingObserver {
    fn include_failed(&self, url: &str, _error: &FetchError) {
        self.failures.lock().unwrap().push(url.to_string());
    }
}

#[test]
fn test_include_url_is_expanded_and_resolved() {
    let body = br#"<!--# set var="boo" value="baz" --><!--# include virtual="/foo?bar=$boo" -->"#;
    let processed = process_document(body, "/").unwrap();
    assert_eq!(
        processed.items,
        vec![OutputItem::Placeholder(0), OutputItem::Text(Vec::new())]
    );
    assert_eq!(processed.urls, vec!["/foo?bar=baz".to_string()]);
}

#[test]
fn test_include_targets_are_kept_as_written() {
    let body = concat!(
        r#"<!--# include virtual="a b.html" -->"#,
        r#"<!--# include virtual="/café.html" -->"#,
        r#"<!--# include virtual="a\b.html" -->"#,
        r#"<!--# include virtual="/foo?bar=a b" -->"#,
        r#"<!--# include virtual="a%20b.html" -->"#,
    );
    let processed = process_document(body.as_bytes(), "/").unwrap();
    assert_eq!(
        processed.urls,
        vec!["/a b.html", "/café.html", r"/a\b.html", "/foo?bar=a b", "/a%20b.html"]
    );
}

#[test]
fn test_relative_include_uses_document_directory() {
    let body = br#"<!--# include virtual="parts/nav.html" -->"#;
    let processed = process_document(body, "/docs/guide/index.shtml").unwrap();
    assert_eq!(processed.urls, vec!["/docs/guide/parts/nav.html".to_string()]);
}

#[tokio::test]
async fn test_recursive_include() {
    let fetcher = InMemoryFetcher::new();
    fetcher.add("/bar.html", r#"bar <!--# include virtual="baz.html"-->"#);
    fetcher.add("/baz.html", "baz");

    let ssi = Ssi::new(Arc::new(fetcher));
    let body = br#"foo <!--# include virtual="bar.html"-->"#;
    let rendered = ssi.render(body, "/", &RequestTemplate::new()).await.unwrap();
    assert_eq!(rendered.body, b"foo bar baz");
}

#[tokio::test]
async fn test_include_with_unusual_characters_from_memory() {
    let fetcher = InMemoryFetcher::new();
    fetcher.add("/a b.html", "space");
    fetcher.add("/café.html", "accent");
    fetcher.add(r"/a\b.html", "backslash");

    let ssi = Ssi::new(Arc::new(fetcher));
    let body = r#"[<!--# include virtual="a b.html" -->|<!--# include virtual="café.html" -->|<!--# include virtual="a\b.html" -->]"#;
    let rendered = ssi
        .render(body.as_bytes(), "/", &RequestTemplate::new())
        .await
        .unwrap();
    assert_eq!(rendered.body, b"[space|accent|backslash]");
}

#[cfg(feature = "tokio-runtime")]
#[tokio::test]
async fn test_include_with_unusual_characters_from_folder() {
    use ssi_interpreter::fetcher::FolderFetcher;

    let root = std::env::temp_dir().join(format!("ssi-include-tests-{}", std::process::id()));
    tokio::fs::create_dir_all(root.join("my dir")).await.unwrap();
    tokio::fs::write(root.join("my dir").join("a b.html"), "space").await.unwrap();
    tokio::fs::write(root.join("café.html"), "accent").await.unwrap();

    let ssi = Ssi::new(Arc::new(FolderFetcher::new(root.clone())));
    let body = r#"[<!--# include virtual="a b.html" -->|<!--# include virtual="/café.html" -->]"#;
    let rendered = ssi
        .render(body.as_bytes(), "/my dir/index.shtml", &RequestTemplate::new())
        .await;
    tokio::fs::remove_dir_all(&root).await.unwrap();

    assert_eq!(rendered.unwrap().body, b"[space|accent]");
}

#[tokio::test]
async fn test_included_document_has_its_own_variables() {
    let fetcher = InMemoryFetcher::new();
    fetcher.add(
        "/part.html",
        r#"[<!--# echo var="outer" --><!--# set var="inner" value="1" -->]"#,
    );

    let ssi = Ssi::new(Arc::new(fetcher));
    let body = br#"<!--# set var="outer" value="x" --><!--# include virtual="/part.html" --><!--# echo var="inner" -->"#;
    let rendered = ssi.render(body, "/", &RequestTemplate::new()).await.unwrap();
    assert_eq!(rendered.body, b"[]");
}

#[tokio::test]
async fn test_failed_include_leaves_gap() {
    let fetcher = InMemoryFetcher::new();
    fetcher.add("/a.html", "A");
    fetcher.add("/c.html", "C");
    let observer = Arc::new(RecordingObserver::default());

    let ssi = Ssi::new(Arc::new(fetcher)).with_observer(observer.clone());
    let body = br#"<!--# include virtual="a.html" -->|<!--# include virtual="b.html" -->|<!--# include virtual="c.html" -->"#;
    let rendered = ssi.render(body, "/", &RequestTemplate::new()).await.unwrap();

    assert_eq!(rendered.body, b"A||C");
    assert_eq!(
        *observer.failures.lock().unwrap(),
        vec!["/b.html".to_string()]
    );
}

#[tokio::test]
async fn test_same_url_included_twice() {
    let fetcher = InMemoryFetcher::new();
    fetcher.add("/x.html", "x");

    let ssi = Ssi::new(Arc::new(fetcher));
    let body = br#"<!--# include virtual="x.html" -->-<!--# include virtual="/x.html" -->"#;
    let rendered = ssi.render(body, "/", &RequestTemplate::new()).await.unwrap();
    assert_eq!(rendered.body, b"x-x");
}

#[tokio::test]
async fn test_include_in_false_branch_is_not_fetched() {
    let observer = Arc::new(RecordingObserver::default());
    let ssi = Ssi::new(Arc::new(InMemoryFetcher::new())).with_observer(observer.clone());

    let body = br#"<!--# if expr="$nope" --><!--# include virtual="/missing" --><!--# endif -->ok"#;
    let rendered = ssi.render(body, "/", &RequestTemplate::new()).await.unwrap();
    assert_eq!(rendered.body, b"ok");
    assert!(observer.failures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_nested_failure_is_reported() {
    let fetcher = InMemoryFetcher::new();
    fetcher.add("/outer.html", r#"(<!--# include virtual="gone.html" -->)"#);
    let observer = Arc::new(RecordingObserver::default());

    let ssi = Ssi::new(Arc::new(fetcher)).with_observer(observer.clone());
    let body = br#"<!--# include virtual="outer.html" -->"#;
    let rendered = ssi.render(body, "/", &RequestTemplate::new()).await.unwrap();

    assert_eq!(rendered.body, b"()");
    assert_eq!(
        *observer.failures.lock().unwrap(),
        vec!["/gone.html".to_string()]
    );
}
