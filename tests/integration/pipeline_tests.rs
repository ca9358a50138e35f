//! End-to-end validation runs over temp registries and loopback stubs.

use std::io::Write;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::sync::mpsc;

use cname_preflight::engine::outcome::Event;
use cname_preflight::{run_validation, PreflightConfig};

use super::stub;

fn registry_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp registry");
    file.write_all(contents.as_bytes()).expect("write registry");
    file
}

fn config_for(file: &tempfile::NamedTempFile) -> PreflightConfig {
    PreflightConfig {
        registry_path: file.path().to_path_buf(),
        timeout: Duration::from_secs(2),
        concurrency: 4,
        ..PreflightConfig::default()
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::Error(message) => errors.push(message),
            Event::Warning(message) => warnings.push(message),
            _ => {}
        }
    }
    (errors, warnings)
}

#[tokio::test]
async fn test_sorted_reachable_registry_succeeds() {
    let port = stub::serve(Router::new().route("/", get(|| async { "ok" }))).await;
    let file = registry_file(&format!(
        r#"var cnames_active = {{
            "alpha": "http://127.0.0.1:{port}",
            "beta": "http://127.0.0.1:{port}",
        }}"#
    ));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let summary = run_validation(config_for(&file), tx).await;

    assert!(summary.success);
    assert_eq!((summary.errors, summary.warnings), (0, 0));

    let (errors, warnings) = drain(&mut rx);
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[tokio::test]
async fn test_unreachable_target_warns_but_succeeds() {
    let ok_port = stub::serve(Router::new().route("/", get(|| async { "ok" }))).await;
    let missing_port =
        stub::serve(Router::new().route("/", get(|| async { StatusCode::NOT_FOUND }))).await;
    let file = registry_file(&format!(
        r#"var cnames_active = {{
            "alpha": "http://127.0.0.1:{ok_port}",
            "beta": "http://127.0.0.1:{missing_port}",
        }}"#
    ));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let summary = run_validation(config_for(&file), tx).await;

    assert!(summary.success, "warnings alone never fail a run");
    assert_eq!((summary.errors, summary.warnings), (0, 1));

    let (_, warnings) = drain(&mut rx);
    assert!(warnings[0].contains("'beta'"), "{warnings:?}");
    assert!(warnings[0].contains("404 Not Found"), "{warnings:?}");
}

#[tokio::test]
async fn test_out_of_order_registry_never_probes() {
    // Targets point at a refused port; if probing ran it would warn, but the
    // ordering failure ends the run first.
    let port = stub::refused_port().await;
    let file = registry_file(&format!(
        r#"var cnames_active = {{
            "beta": "http://127.0.0.1:{port}",
            "alpha": "http://127.0.0.1:{port}",
        }}"#
    ));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let summary = run_validation(config_for(&file), tx).await;

    assert!(!summary.success);
    assert!(summary.errors >= 1);
    assert_eq!(summary.warnings, 0);

    let (errors, warnings) = drain(&mut rx);
    assert!(warnings.is_empty(), "{warnings:?}");
    assert!(
        errors.iter().all(|e| e.starts_with("Wrong sorting:")),
        "{errors:?}"
    );
}

#[tokio::test]
async fn test_blocklisted_key_ends_run_with_error() {
    let port = stub::serve(Router::new().route("/", get(|| async { "ok" }))).await;
    let file = registry_file(&format!(
        r#"var cnames_active = {{
            "42": "http://127.0.0.1:{port}",
        }}"#
    ));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let summary = run_validation(config_for(&file), tx).await;

    assert!(!summary.success);

    let (errors, _) = drain(&mut rx);
    assert_eq!(errors, ["CNAME is blocklisted: '42'"]);
}

#[tokio::test]
async fn test_empty_key_probes_root_domain_record() {
    let port = stub::serve(Router::new().route("/", get(|| async { "ok" }))).await;
    let file = registry_file(&format!(
        r#"var cnames_active = {{
            "": "http://127.0.0.1:{port}",
        }}"#
    ));

    let (tx, _rx) = mpsc::unbounded_channel();
    let summary = run_validation(config_for(&file), tx).await;

    assert!(summary.success);
    assert_eq!((summary.errors, summary.warnings), (0, 0));
}
