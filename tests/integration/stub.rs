//! Loopback HTTP stubs for reachability tests.

use axum::Router;

/// Serve a router on an ephemeral loopback port; returns the port.
pub async fn serve(router: Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let port = listener.local_addr().expect("local addr").port();

    tokio::spawn(async move {
        // The server lives for the rest of the test process.
        let _ = axum::serve(listener, router).await;
    });

    port
}

/// Reserve a loopback port nothing listens on.
pub async fn refused_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}
