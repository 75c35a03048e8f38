//! HTTP resolution server, driven in-process.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use wayfinder::config::parse_config;
use wayfinder::HttpServer;

const CONFIG: &str = r#"
[[routes]]
path = "/"

[[routes]]
path = "/user/:id"
app = "users"
meta = { title = "User" }

  [[routes.children]]
  path = "posts/:post"

[[routes]]
path = "/old"
redirect = "/user/1"
status_code = 301

[[routes]]
path = "/external"
redirect = "https://docs.example.org/guide"

[[routes]]
path = "/moved"
redirect = "/nowhere"
status_code = 308
"#;

fn app(config: &str) -> axum::Router {
    HttpServer::new(parse_config(config).unwrap()).unwrap().router()
}

async fn get(app: axum::Router, uri: &str, headers: &[(&str, &str)]) -> axum::response::Response {
    let mut request = Request::builder().uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap())
}

#[tokio::test]
async fn test_matched_route_summary() {
    let response = get(app(CONFIG), "/user/7/posts/intro?tab=a", &[("host", "site.test")]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["path"], "/user/7/posts/intro");
    assert_eq!(body["fullPath"], "/user/7/posts/intro?tab=a");
    assert_eq!(body["url"], "http://site.test/user/7/posts/intro?tab=a");
    assert_eq!(body["params"]["id"], "7");
    assert_eq!(body["params"]["post"], "intro");
    assert_eq!(body["query"]["tab"], "a");
    assert_eq!(body["matched"][0], "/user/:id");
    assert_eq!(body["matched"][1], "/user/:id/posts/:post");
    assert!(body["app"].is_null());
}

#[tokio::test]
async fn test_leaf_meta_and_app() {
    let body = json(get(app(CONFIG), "/user/3", &[]).await).await;
    assert_eq!(body["app"], "users");
    assert_eq!(body["meta"]["title"], "User");
}

#[tokio::test]
async fn test_unmatched_is_not_found() {
    let response = get(app(CONFIG), "/missing", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_guard_redirect_uses_status_code() {
    let response = get(app(CONFIG), "/old", &[("host", "site.test")]).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), Some("http://site.test/user/1"));
}

#[tokio::test]
async fn test_external_redirect_goes_through_fallback() {
    let response = get(app(CONFIG), "/external", &[]).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("https://docs.example.org/guide"));
}

#[tokio::test]
async fn test_redirect_to_unmatched_route() {
    let response = get(app(CONFIG), "/moved", &[("host", "site.test")]).await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), Some("http://site.test/nowhere"));
}

#[tokio::test]
async fn test_forwarded_headers_set_base() {
    let response = get(
        app(CONFIG),
        "/old",
        &[
            ("host", "internal:3000"),
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "shop.example.com"),
            ("x-forwarded-prefix", "/store"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), Some("https://shop.example.com/store/user/1"));
}

#[tokio::test]
async fn test_configured_base_wins() {
    let config = format!("base = \"https://fixed.example.com/app/\"\n{CONFIG}");
    let response = get(app(&config), "/app/user/9", &[("host", "other.test")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["url"], "https://fixed.example.com/app/user/9");
    assert_eq!(body["path"], "/user/9");
}

#[tokio::test]
async fn test_redirect_loop_is_server_error() {
    let config = r#"
    [[routes]]
    path = "/ping"
    redirect = "/pong"

    [[routes]]
    path = "/pong"
    redirect = "/ping"
    "#;
    let response = get(app(config), "/ping", &[]).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json(response).await["error"], "navigation_failed");
}
