mod common;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::json;

use common::{course_body, TestApp};

#[tokio::test]
async fn students_read_editors_write() -> Result<()> {
    let app = TestApp::new()?;
    let student = app.student().await?;
    let mentor = app.signup("mentor@example.com", "mentor").await?;

    let (status, body) = app.post("/api/v1/courses", Some(&student), course_body("Rust 101")).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Insufficient permissions");

    let (status, body) = app.post("/api/v1/courses", Some(&mentor), course_body("Rust 101")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Course created successfully");
    assert_eq!(body["data"]["title"], "Rust 101");
    assert_eq!(body["data"]["price"], 49.5);

    let (status, body) = app.get("/api/v1/courses", Some(&student)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn list_is_served_from_cache_until_a_write() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    app.post("/api/v1/courses", Some(&admin), course_body("First")).await?;

    let (_, first) = app.get("/api/v1/courses", Some(&admin)).await?;
    assert_eq!(first["message"], "Courses found successfully");
    let (_, second) = app.get("/api/v1/courses", Some(&admin)).await?;
    assert_eq!(second["message"], "Courses found in cache");
    assert_eq!(first["data"], second["data"]);

    app.post("/api/v1/courses", Some(&admin), course_body("Second")).await?;
    let (_, after) = app.get("/api/v1/courses", Some(&admin)).await?;
    assert_eq!(after["message"], "Courses found successfully");
    assert_eq!(after["data"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn update_is_a_sparse_patch() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    let (_, created) = app.post("/api/v1/courses", Some(&admin), course_body("Rust 101")).await?;
    let id = created["data"]["id"].as_i64().context("id")?;

    // Warm the record cache so the update has something to invalidate
    app.get(&format!("/api/v1/courses/{}", id), Some(&admin)).await?;

    let (status, body) = app
        .put(&format!("/api/v1/courses/{}", id), Some(&admin), json!({"price": 10.0, "title": ""}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Course updated successfully");
    assert_eq!(body["data"]["price"], 10.0);
    assert_eq!(body["data"]["title"], "Rust 101");
    assert_eq!(body["data"]["duration"], 10);

    let (_, shown) = app.get(&format!("/api/v1/courses/{}", id), Some(&admin)).await?;
    assert_eq!(shown["message"], "Course found successfully");
    assert_eq!(shown["data"]["price"], 10.0);
    Ok(())
}

#[tokio::test]
async fn show_reports_cache_hits() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    let (_, created) = app.post("/api/v1/courses", Some(&admin), course_body("Rust 101")).await?;
    let uri = format!("/api/v1/courses/{}", created["data"]["id"]);

    let (status, first) = app.get(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Course found successfully");

    let (status, second) = app.get(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "Course found in cache");
    assert_eq!(second["data"], first["data"]);
    Ok(())
}

#[tokio::test]
async fn update_rejects_invalid_present_fields() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    let (_, created) = app.post("/api/v1/courses", Some(&admin), course_body("Rust 101")).await?;
    let id = created["data"]["id"].as_i64().context("id")?;

    let (status, body) = app
        .put(&format!("/api/v1/courses/{}", id), Some(&admin), json!({"duration": -3}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"][0]["field"], "duration");
    Ok(())
}

#[tokio::test]
async fn update_of_missing_course_is_not_found_before_validation() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;

    let (status, body) = app
        .put("/api/v1/courses/999999", Some(&admin), json!({"duration": -3}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Course not found");
    Ok(())
}

#[tokio::test]
async fn create_validates_required_fields() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;

    let (status, body) = app
        .post("/api/v1/courses", Some(&admin), json!({"title": "Only a title", "price": -1}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let fields: Vec<&str> = body["data"]
        .as_array()
        .map(|v| v.iter().filter_map(|f| f["field"].as_str()).collect())
        .unwrap_or_default();
    assert!(fields.contains(&"description"));
    assert!(fields.contains(&"instructor"));
    assert!(fields.contains(&"duration"));
    assert!(fields.contains(&"price"));
    Ok(())
}

#[tokio::test]
async fn deleted_course_is_not_served_from_cache() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    let (_, created) = app.post("/api/v1/courses", Some(&admin), course_body("Doomed")).await?;
    let uri = format!("/api/v1/courses/{}", created["data"]["id"]);

    let (status, _) = app.get(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    app.get("/api/v1/courses", Some(&admin)).await?;

    let (status, body) = app.delete(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Course deleted successfully");
    assert!(body["data"].is_null());

    let (status, body) = app.get(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Course not found");

    let (_, list) = app.get("/api/v1/courses", Some(&admin)).await?;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(0));

    let (status, _) = app.delete(&uri, Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_not_found() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;

    let (status, body) = app.get("/api/v1/courses/abc", Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Course not found");

    let (status, _) = app.get("/api/v1/courses/999999", Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
