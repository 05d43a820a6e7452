// tests/api_http.rs
//
// HTTP-level tests for the dashboard Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::fs;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use newsletter_desk::{api, AppState, ArtifactLayout, DashboardConfig, PipelineRunner};

const BODY_LIMIT: usize = 1024 * 1024;

struct NoopRunner;

#[async_trait::async_trait]
impl PipelineRunner for NoopRunner {
    async fn run(&self) -> anyhow::Result<()> {
        Ok(())
    }
    fn name(&self) -> &str {
        "noop"
    }
}

fn app_for(dir: &std::path::Path) -> Router {
    let cfg = DashboardConfig {
        artifacts: ArtifactLayout::in_dir(dir),
        ..Default::default()
    };
    api::router(AppState::new(&cfg, Arc::new(NoopRunner)))
}

fn write_full_run(layout: &ArtifactLayout) {
    fs::create_dir_all(&layout.results_dir).unwrap();
    fs::write(
        layout.news_path(),
        r#"```json
{"topics":[
  {"topic":"Treatment Methods","items":[
    {"title":"CAR-T update","url":"https://news.example/cart","publish_date":"2025-01-02"},
    {"title":"No link here","url":""}
  ]},
  {"topic":"Precision Oncologgy","items":[{"title":"typo","url":"https://x.example"}]}
]}
```"#,
    )
    .unwrap();
    fs::write(
        layout.summaries_path(),
        r#"{"overview":"Weekly digest","topics":[
            {"topic":"Treatment Methods","summary":"Treatment summary","bullets":["x","y"]},
            {"topic":"Precision Oncology","summary":"PO summary","bullets":[]}
        ]}"#,
    )
    .unwrap();
    fs::write(layout.draft_path(), "<h2>Draft</h2>").unwrap();
    fs::write(
        layout.newsletter_path(),
        "<html><head><title>N</title></head><body><h1>News</h1>\
         <h2>Overview</h2><p>Big week.</p>\
         <h2>Research &amp; Prevention</h2><p>Screening expands.</p>\
         <h2>Precision Oncology</h2><p>Biomarkers.</p></body></html>",
    )
    .unwrap();
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, headers, String::from_utf8(bytes).expect("utf8"))
}

#[tokio::test]
async fn health_returns_ok() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _, body) = get(app_for(dir.path()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn dashboard_renders_with_no_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _, body) = get(app_for(&dir.path().join("results")), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Run the pipeline to populate topics."));
    assert!(body.contains("No final newsletter yet."));
}

#[tokio::test]
async fn api_view_reconciles_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::in_dir(dir.path());
    write_full_run(&layout);

    let (status, _, body) = get(app_for(dir.path()), "/api/view").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_str(&body).expect("view json");

    assert_eq!(
        v["topics"],
        serde_json::json!([
            "Research & Prevention",
            "Treatment Methods",
            "Precision Oncology"
        ])
    );
    assert_eq!(v["selected"], "Research & Prevention");
    assert_eq!(v["overview"]["source"], "rendered");
    assert_eq!(v["overview"]["body"], "<p>Big week.</p>");
    assert_eq!(v["panel"]["body"]["text"], "<p>Screening expands.</p>");
    assert_eq!(v["has_newsletter"], true);
}

#[tokio::test]
async fn topic_query_selects_and_falls_back_to_summary() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::in_dir(dir.path());
    write_full_run(&layout);
    let app = app_for(dir.path());

    let (_, _, body) = get(app.clone(), "/api/view?topic=Treatment%20Methods").await;
    let v: Json = serde_json::from_str(&body).unwrap();
    assert_eq!(v["selected"], "Treatment Methods");
    assert_eq!(v["panel"]["body"]["source"], "summary");
    assert_eq!(v["panel"]["body"]["text"], "Treatment summary");
    assert_eq!(v["panel"]["bullets"], serde_json::json!(["x", "y"]));
    let links = v["panel"]["further_reading"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["url"], "https://news.example/cart");

    // unknown names are ignored
    let (_, _, body) = get(app, "/api/view?topic=Precision%20Oncologgy").await;
    let v: Json = serde_json::from_str(&body).unwrap();
    assert_eq!(v["selected"], "Research & Prevention");
}

#[tokio::test]
async fn selection_is_per_request() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::in_dir(dir.path());
    write_full_run(&layout);
    let app = app_for(dir.path());

    let (_, _, body) = get(app.clone(), "/api/view?topic=Precision%20Oncology").await;
    let v: Json = serde_json::from_str(&body).unwrap();
    assert_eq!(v["selected"], "Precision Oncology");

    // another visitor without a choice gets the first eligible topic
    let (_, _, body) = get(app, "/api/view").await;
    let v: Json = serde_json::from_str(&body).unwrap();
    assert_eq!(v["selected"], "Research & Prevention");
}

#[tokio::test]
async fn non_http_urls_are_not_linked() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::in_dir(dir.path());
    write_full_run(&layout);
    fs::write(
        layout.news_path(),
        r#"{"topics":[{"topic":"Treatment Methods","items":[
            {"title":"evil","url":"javascript:alert(document.cookie)"},
            {"title":"CAR-T update","url":"https://news.example/cart"}
        ]}]}"#,
    )
    .unwrap();

    let (status, _, page) = get(app_for(dir.path()), "/?topic=Treatment%20Methods").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!page.contains("javascript:"));
    assert!(page.contains(r#"href="https://news.example/cart""#));
}

#[tokio::test]
async fn dashboard_lists_topics_in_canonical_order() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::in_dir(dir.path());
    write_full_run(&layout);

    let (status, _, body) = get(app_for(dir.path()), "/?topic=Precision%20Oncology").await;
    assert_eq!(status, StatusCode::OK);
    let rp = body.find("value=\"Research &amp; Prevention\"").unwrap();
    let tm = body.find("value=\"Treatment Methods\"").unwrap();
    let po = body.find("value=\"Precision Oncology\"").unwrap();
    assert!(rp < tm && tm < po);
    assert!(!body.contains("Oncologgy"));
    assert!(body.contains("Summary: Precision Oncology"));
    assert!(body.contains("Download newsletter.html"));
}

#[tokio::test]
async fn download_is_themed_attachment() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::in_dir(dir.path());
    write_full_run(&layout);

    let (status, headers, body) = get(app_for(dir.path()), "/newsletter.html").await;
    assert_eq!(status, StatusCode::OK);
    let cd = headers
        .get(header::CONTENT_DISPOSITION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    assert!(cd.starts_with("attachment"), "content-disposition: {cd}");
    assert!(body.starts_with("<html><head>\n<style>"));
    assert!(body.contains("<h2>Precision Oncology</h2>"));
}

#[tokio::test]
async fn preview_and_download_404_without_newsletter() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(dir.path());
    let (status, _, body) = get(app.clone(), "/preview").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No final newsletter yet."));
    let (status, _, _) = get(app, "/newsletter.html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn raw_artifacts_are_served() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::in_dir(dir.path());
    write_full_run(&layout);
    let (status, _, body) = get(app_for(dir.path()), "/artifacts/draft.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h2>Draft</h2>");
}
