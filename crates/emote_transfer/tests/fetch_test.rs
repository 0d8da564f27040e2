//! Tests for the HTTP fetcher against an in-process server.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::routing::get;
use common::png;
use emote_error::FetchErrorKind;
use emote_transfer::{ARCHIVE_MIMETYPES, Fetcher, HttpFetcher, IMAGE_MIMETYPES};
use std::time::Duration;

async fn serve() -> String {
    let image = png(4, 4);
    let app = Router::new()
        .route(
            "/blob.png",
            get(move || {
                let image = image.clone();
                async move { ([(header::CONTENT_TYPE, "image/png; charset=binary")], image) }
            }),
        )
        .route(
            "/page.html",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html></html>") }),
        )
        .route(
            "/archive.bin",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/octet-stream")],
                    vec![0u8; 16],
                )
            }),
        )
        .route(
            "/big.zip",
            get(|| async { ([(header::CONTENT_TYPE, "application/zip")], vec![0u8; 4096]) }),
        )
        .route(
            "/streamed.zip",
            get(|| async {
                let chunks = (0..8).map(|_| Ok::<_, std::io::Error>(vec![0u8; 512]));
                (
                    [(header::CONTENT_TYPE, "application/zip")],
                    Body::from_stream(futures::stream::iter(chunks)),
                )
            }),
        )
        .route("/gone", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/slow.png",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                ([(header::CONTENT_TYPE, "image/png")], "late")
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Bind test server");
    let address = listener.local_addr().expect("Local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Serve");
    });
    format!("http://{}", address)
}

fn fetcher() -> HttpFetcher {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(300))
        .build()
        .expect("Client");
    HttpFetcher::with_client(client, Duration::from_millis(300))
}

#[tokio::test]
async fn test_fetch_image_with_and_without_head() {
    let base = serve().await;
    let fetcher = fetcher();
    let url = format!("{}/blob.png", base);

    let body = fetcher.fetch(&url, IMAGE_MIMETYPES, true).await.unwrap();
    assert_eq!(body, png(4, 4));

    let body = fetcher.fetch(&url, IMAGE_MIMETYPES, false).await.unwrap();
    assert_eq!(body, png(4, 4));
}

#[tokio::test]
async fn test_wrong_content_type() {
    let base = serve().await;
    let err = fetcher()
        .fetch(&format!("{}/page.html", base), IMAGE_MIMETYPES, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FetchErrorKind::InvalidFile);

    let body = fetcher()
        .fetch(&format!("{}/archive.bin", base), ARCHIVE_MIMETYPES, true)
        .await
        .unwrap();
    assert_eq!(body.len(), 16);
}

#[tokio::test]
async fn test_error_status() {
    let base = serve().await;
    let err = fetcher()
        .fetch(&format!("{}/gone", base), IMAGE_MIMETYPES, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FetchErrorKind::Status(404));
}

#[tokio::test]
async fn test_timeout() {
    let base = serve().await;
    let err = fetcher()
        .fetch(&format!("{}/slow.png", base), IMAGE_MIMETYPES, false)
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_invalid_url() {
    let err = fetcher()
        .fetch("this is not a url", IMAGE_MIMETYPES, true)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FetchErrorKind::InvalidUrl(_)));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Bind");
    let address = listener.local_addr().expect("Local address");
    drop(listener);

    let err = fetcher()
        .fetch(&format!("http://{}/blob.png", address), IMAGE_MIMETYPES, false)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FetchErrorKind::Transport(_)));
}

#[tokio::test]
async fn test_body_over_limit_is_rejected() {
    let base = serve().await;
    let limited = fetcher().with_body_limit(1000);

    for path in ["big.zip", "streamed.zip"] {
        let err = limited
            .fetch(&format!("{}/{}", base, path), ARCHIVE_MIMETYPES, false)
            .await
            .unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::TooLarge(1000), "{path}");
    }

    let body = fetcher()
        .with_body_limit(4096)
        .fetch(&format!("{}/streamed.zip", base), ARCHIVE_MIMETYPES, false)
        .await
        .unwrap();
    assert_eq!(body.len(), 4096);
}
