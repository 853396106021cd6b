//! browse_web 端到端测试：需要本机安装 Chrome/Chromium，默认忽略
//!
//! 运行：cargo test --test browse_web -- --ignored

#![cfg(feature = "browser")]

use axum::{response::Html, routing::get};
use serde_json::json;
use tokio::net::TcpListener;

use toolgate::tools::{BrowserTool, Tool};

async fn spawn_page() -> String {
    let body = "x".repeat(20_000);
    let page = format!(
        "<html><head><title>Long page</title><style>.a{{}}</style></head>\
         <body><nav>menu</nav><p>{}</p><script>var s = 1;</script><footer>foot</footer></body></html>",
        body
    );
    let app = axum::Router::new().route("/", get(move || async move { Html(page) }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

#[tokio::test]
#[ignore]
async fn long_page_is_truncated_to_limit() {
    let url = spawn_page().await;
    let tool = BrowserTool::new(30, 15_000);
    let out = tool.execute(json!({ "url": url })).await.unwrap();

    assert_eq!(out["title"], "Long page");
    let content = out["content"].as_str().unwrap();
    assert_eq!(content.chars().count(), 15_000);
    assert!(!content.contains("menu"));
}

#[tokio::test]
#[ignore]
async fn unreachable_url_fails_and_releases_browser() {
    let tool = BrowserTool::new(5, 15_000);
    let err = tool
        .execute(json!({ "url": "http://127.0.0.1:1/" }))
        .await
        .unwrap_err();
    assert!(matches!(err, toolgate::ToolError::Browser(_)), "{err:?}");
}

#[tokio::test]
#[ignore]
async fn about_blank_returns_without_waiting_for_timeout() {
    let tool = BrowserTool::new(10, 15_000);
    let start = std::time::Instant::now();
    let out = tool.execute(json!({ "url": "about:blank" })).await.unwrap();

    assert_eq!(out["content"], "");
    assert!(start.elapsed() < std::time::Duration::from_secs(8));
}
