// Integration tests for the axum boundary: status codes, streaming and the Page extractor

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_stream::StreamExt;
use tower::ServiceExt;
use vista::{Links, Manager, MemoryStore, Options, Page, CONTENT_TYPE};

fn manager(options: Options) -> Arc<Manager> {
    let store = MemoryStore::new()
        .with("ok.html", "<p>{{ .data.title }}</p>")
        .with("broken.html", "<p>start</p>{{ boom }}<p>end</p>")
        .with(
            "admin/events.html",
            r#"<a href="{{ link "eventByID" 1234 }}">event</a><link href="{{ rel "/static" "app.css" }}">{{ if under "/admin" }}admin{{ end }}"#,
        );

    let options = options.func("boom", |_, _| Err("kaboom".into()));
    Arc::new(Manager::new(store, options))
}

fn app(manager: Arc<Manager>, links: Arc<Links>) -> Router {
    Router::new()
        .route(
            "/:name",
            get({
                let manager = Arc::clone(&manager);
                move |page: Page| async move {
                    let name = format!("{}.html", page.path.trim_start_matches('/'));
                    manager.instance(&name, page.view(json!({"title": "T"})))
                }
            }),
        )
        .route(
            "/admin/events/",
            get(move |page: Page| async move { manager.html("admin/events.html", page.view(())) }),
        )
        .layer(Extension(links))
}

fn links() -> Arc<Links> {
    let mut links = Links::new();
    links.named("eventByID", "/event/:id");
    Arc::new(links)
}

async fn call(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response: Response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_ok() {
    let links = links();
    let app = app(manager(Options::new().links(Arc::clone(&links))), links);

    let (status, content_type, body) = call(app, "/ok").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some(CONTENT_TYPE));
    assert_eq!(body, "<p>T</p>");
}

#[tokio::test]
async fn test_missing_template_is_server_error() {
    let links = links();
    let app = app(manager(Options::new()), links);

    let (status, content_type, body) = call(app, "/missing").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type, None);
    assert_eq!(body, "");
}

#[tokio::test]
async fn test_buffered_exec_error_is_server_error() {
    let app = app(manager(Options::new()), links());

    let (status, _, body) = call(app, "/broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "");
}

#[tokio::test]
async fn test_streamed_exec_error_keeps_status() {
    let app = app(manager(Options::new().stream()), links());

    let (status, _, body) = call(app, "/broken").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<p>start</p>");
}

#[tokio::test]
async fn test_links_relative_to_request() {
    let links = links();
    let app = app(manager(Options::new().cache().links(Arc::clone(&links))), links);

    let (status, _, body) = call(app, "/admin/events/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"<a href="../../event/1234">event</a><link href="../../static/app.css">admin"#
    );
}

#[tokio::test]
async fn test_link_without_installed_links_fails() {
    let app = app(manager(Options::new()), links());

    let (status, _, _) = call(app, "/admin/events/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_streamed_page_arrives_before_it_completes() {
    let (release, held) = mpsc::channel::<()>();
    let held = Mutex::new(held);
    let store = MemoryStore::new().with("slow.html", "{{ .head }}{{ hold }}<p>end</p>");
    let options = Options::new().stream().func("hold", move |_, _| {
        let _ = held.lock().unwrap().recv_timeout(Duration::from_secs(10));
        Ok(json!(""))
    });
    let manager = Arc::new(Manager::new(store, options));

    let head = "x".repeat(16 * 1024);
    let app = Router::new().route(
        "/slow",
        get({
            let head = head.clone();
            move || async move { manager.instance("slow.html", json!({ "head": head })) }
        }),
    );

    let response = app
        .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body().into_data_stream();
    let first = tokio::time::timeout(Duration::from_secs(5), body.next()).await;
    release.send(()).unwrap();

    let first = first.expect("no chunk while the page was held").unwrap().unwrap();
    assert_eq!(first, head.as_bytes());

    let mut rest = Vec::new();
    while let Some(chunk) = body.next().await {
        rest.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(rest, b"<p>end</p>");
}
