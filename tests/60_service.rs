mod common;

use anyhow::Result;
use axum::http::StatusCode;

use common::TestApp;

#[tokio::test]
async fn health_reports_store_and_cache() -> Result<()> {
    let app = TestApp::new()?;
    let (status, body) = app.get("/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
    assert_eq!(body["data"]["cache"], app.cache.mode());
    Ok(())
}

#[tokio::test]
async fn root_describes_the_api() -> Result<()> {
    let app = TestApp::new()?;
    let (status, body) = app.get("/", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "course-catalog");
    assert!(body["data"]["endpoints"]["courses"].is_string());
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let response = app.send(axum::http::Method::GET, "/api/v2/courses", None, None).await?;
    assert_eq!(response.0, StatusCode::NOT_FOUND);
    Ok(())
}
