//! Live reachability probes against loopback stub servers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use cname_preflight::checks::reachability::{build_client, probe, ProbeConfig, ProbeOutcome};
use cname_preflight::Record;

use super::stub;

fn probe_config() -> ProbeConfig {
    ProbeConfig {
        root_domain: "js.org".to_string(),
        timeout: Duration::from_secs(2),
        ..ProbeConfig::default()
    }
}

fn record_for_port(key: &str, port: u16) -> Record {
    Record::new(key, format!("http://127.0.0.1:{port}"))
}

fn expect_warning(outcome: ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Warn(message) => message,
        other => panic!("expected a warning, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_200_produces_no_warning() {
    let port = stub::serve(Router::new().route("/", get(|| async { "ok" }))).await;
    let config = probe_config();
    let client = build_client(&config).unwrap();

    let outcome = probe(&client, &record_for_port("alpha", port), &config).await;
    assert_eq!(outcome, ProbeOutcome::Ok);
}

#[tokio::test]
async fn test_virtual_host_header_is_sent() {
    let router = Router::new().route(
        "/",
        get(|headers: HeaderMap| async move {
            match headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
                Some("alpha.js.org") => StatusCode::OK,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }),
    );
    let port = stub::serve(router).await;
    let config = probe_config();
    let client = build_client(&config).unwrap();

    let outcome = probe(&client, &record_for_port("alpha", port), &config).await;
    assert_eq!(outcome, ProbeOutcome::Ok);
}

#[tokio::test]
async fn test_http_404_produces_one_warning_citing_status() {
    let port = stub::serve(
        Router::new().route("/", get(|| async { StatusCode::NOT_FOUND })),
    )
    .await;
    let config = probe_config();
    let client = build_client(&config).unwrap();

    let message = expect_warning(probe(&client, &record_for_port("alpha", port), &config).await);
    assert!(message.contains("404 Not Found"), "{message}");
    assert!(message.starts_with("Unreachable: 'alpha'"), "{message}");
}

#[tokio::test]
async fn test_redirect_to_foreign_host_warns_with_first_status() {
    let router = Router::new().route(
        "/",
        get(|| async {
            (
                StatusCode::MOVED_PERMANENTLY,
                [(header::LOCATION, "https://elsewhere.example.org")],
            )
        }),
    );
    let port = stub::serve(router).await;
    let config = probe_config();
    let client = build_client(&config).unwrap();

    let message = expect_warning(probe(&client, &record_for_port("alpha", port), &config).await);
    assert!(message.contains("301 Moved Permanently"), "{message}");
}

#[tokio::test]
async fn test_same_host_https_redirect_triggers_re_probe() {
    // The stub cannot answer TLS, so the HTTPS re-probe fails; what matters
    // is that the failure is exactly one warning from the second request,
    // not an acceptance of the redirect itself.
    let port = stub::refused_port().await;
    let location = format!("https://127.0.0.1:{port}");
    let router = Router::new().route(
        "/",
        get(move || {
            let location = location.clone();
            async move { (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]) }
        }),
    );

    // Serve the HTTP side on the same port the Location header names, so the
    // authority comparison matches.
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .expect("rebind reserved port");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let config = probe_config();
    let client = build_client(&config).unwrap();

    let message = expect_warning(probe(&client, &record_for_port("alpha", port), &config).await);
    assert!(message.starts_with("Unreachable: 'alpha'"), "{message}");
}

#[tokio::test]
async fn test_same_host_upgrade_redirect_that_succeeds_is_ok() {
    // One stub plays both roles: the first request gets the upgrade
    // redirect, the re-probe gets a 200. Pointing the re-probe scheme at
    // plain http lets the stub answer it without TLS.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let port = listener.local_addr().expect("local addr").port();
    let location = format!("https://127.0.0.1:{port}");

    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new().route(
        "/",
        get(move || {
            let location = location.clone();
            let hits = hits.clone();
            async move {
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)])
                        .into_response()
                } else {
                    StatusCode::OK.into_response()
                }
            }
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let mut config = probe_config();
    config.upgrade_scheme = "http".to_string();
    let client = build_client(&config).unwrap();

    let outcome = probe(&client, &record_for_port("alpha", port), &config).await;
    assert_eq!(outcome, ProbeOutcome::Ok);
}

#[tokio::test]
async fn test_connection_refused_produces_warning() {
    let port = stub::refused_port().await;
    let config = probe_config();
    let client = build_client(&config).unwrap();

    let message = expect_warning(probe(&client, &record_for_port("alpha", port), &config).await);
    assert!(message.starts_with("Unreachable: 'alpha'"), "{message}");
}

#[tokio::test]
async fn test_invalid_target_is_structural_error() {
    let config = probe_config();
    let client = build_client(&config).unwrap();
    let record = Record::new("alpha", "");

    match probe(&client, &record, &config).await {
        ProbeOutcome::InvalidTarget(message) => {
            assert_eq!(message, "CNAME target is not a valid url: 'alpha' => ''");
        }
        other => panic!("expected InvalidTarget, got {other:?}"),
    }
}
