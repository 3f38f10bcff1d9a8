/// CLI tool for rendering SSI documents from disk
use ssi_interpreter::diagnostic::{report_directive_error, report_ssi_error, report_warning};
use ssi_interpreter::fetcher::{FetchError, FolderFetcher};
use ssi_interpreter::resolver::IncludeObserver;
use ssi_interpreter::{process_document, DirectiveWarning, RequestTemplate, Ssi, SsiOptions};
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  ssi <file> [root]                Render a document, resolving includes from root");
    eprintln!("  ssi --check <file>               Report directive problems without fetching");
    eprintln!("  ssi -                            Read the document from stdin");
    eprintln!("  ssi --help                       Show this help message");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  <file>      Path to the document");
    eprintln!("  [root]      Document root for includes (default: the file's directory)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  ssi public/index.shtml           # Includes resolved below public/");
    eprintln!("  ssi page.shtml ./site            # Includes resolved below ./site");
    eprintln!("  cat page.shtml | ssi - ./site    # Read from stdin");
}

/// Prints failed includes to stderr
struct StderrObserver;

impl IncludeObserver for StderrObserver {
    fn include_failed(&self, url: &str, error: &FetchError) {
        eprintln!("warning: include {} failed: {}", url, error);
    }
}

fn read_document(path: &str) -> Vec<u8> {
    if path == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer).unwrap_or_else(|e| {
            eprintln!("Error reading from stdin: {}", e);
            process::exit(1);
        });
        buffer
    } else {
        fs::read(path).unwrap_or_else(|e| {
            eprintln!("Error reading file '{}': {}", path, e);
            process::exit(1);
        })
    }
}

/// The document is served at `/<file name>` so relative includes resolve against the root
fn base_path(path: &str) -> String {
    if path == "-" {
        return "/".to_string();
    }
    let name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("/{}", name)
}

fn print_warnings(source_name: &str, source: &str, warnings: &[DirectiveWarning]) {
    for warning in warnings {
        eprint!("{}", report_warning(source_name, source, warning));
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    if args[1] == "--help" || args[1] == "-h" {
        print_usage();
        process::exit(0);
    }

    if args[1] == "--check" {
        let Some(path) = args.get(2) else {
            print_usage();
            process::exit(1);
        };
        let body = read_document(path);
        let source = String::from_utf8_lossy(&body);
        match process_document(&body, &base_path(path)) {
            Ok(processed) => {
                print_warnings(path, &source, &processed.warnings);
                for url in &processed.urls {
                    println!("{}", url);
                }
            }
            Err(e) => {
                eprint!("{}", report_directive_error(path, &source, &e));
                process::exit(1);
            }
        }
        return;
    }

    let path = &args[1];
    let source_name = if path == "-" { "<stdin>" } else { path.as_str() };

    let root = match args.get(2) {
        Some(root) => PathBuf::from(root),
        None if path == "-" => PathBuf::from("."),
        None => Path::new(path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let body = read_document(path);
    let source = String::from_utf8_lossy(&body);

    let options = SsiOptions {
        log_includes: false,
        ..SsiOptions::default()
    };
    let ssi = Ssi::new(Arc::new(FolderFetcher::new(root)))
        .with_options(options)
        .with_observer(Arc::new(StderrObserver));

    match ssi.render(&body, &base_path(path), &RequestTemplate::new()).await {
        Ok(rendered) => {
            print_warnings(source_name, &source, &rendered.warnings);
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(&rendered.body).and_then(|_| stdout.flush()) {
                eprintln!("Error writing output: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            eprint!("{}", report_ssi_error(source_name, &source, &e));
            process::exit(1);
        }
    }
}
