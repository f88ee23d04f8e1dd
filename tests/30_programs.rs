mod common;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::json;

use common::{program_body, TestApp};

#[tokio::test]
async fn program_lifecycle() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;

    let (status, created) = app.post("/api/v1/programs", Some(&admin), program_body("Bootcamp")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["message"], "Program created successfully");
    assert_eq!(created["data"]["type"], "intensive");
    assert_eq!(created["data"]["features"], json!(["Mentoring", "Certificate"]));
    let uri = format!("/api/v1/programs/{}", created["data"]["id"].as_i64().context("id")?);

    let (status, shown) = app.get(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["message"], "Program found successfully");
    assert_eq!(shown["data"], created["data"]);

    let (status, updated) = app
        .put(&uri, Some(&admin), json!({"type": "regular", "features": ["Self-paced"]}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["type"], "regular");
    assert_eq!(updated["data"]["features"], json!(["Self-paced"]));
    assert_eq!(updated["data"]["title"], "Bootcamp");

    let (status, deleted) = app.delete(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Program deleted successfully");

    let (status, body) = app.get(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Program not found");
    Ok(())
}

#[tokio::test]
async fn unknown_program_type_is_rejected() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;

    let mut body = program_body("Odd");
    body["type"] = json!("weekend");
    let (status, response) = app.post("/api/v1/programs", Some(&admin), body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["data"][0]["field"], "type");

    let (_, created) = app.post("/api/v1/programs", Some(&admin), program_body("Fine")).await?;
    let uri = format!("/api/v1/programs/{}", created["data"]["id"]);
    let (status, _) = app.put(&uri, Some(&admin), json!({"type": "weekend"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn students_cannot_change_programs() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    let student = app.student().await?;
    let (_, created) = app.post("/api/v1/programs", Some(&admin), program_body("Bootcamp")).await?;
    let uri = format!("/api/v1/programs/{}", created["data"]["id"]);

    let (status, _) = app.put(&uri, Some(&student), json!({"title": "Hijacked"})).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, Some(&student)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, list) = app.get("/api/v1/programs", Some(&student)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["message"], "Programs found successfully");
    assert_eq!(list["data"][0]["title"], "Bootcamp");
    Ok(())
}
