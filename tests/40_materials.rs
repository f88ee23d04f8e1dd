mod common;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::json;

use common::{material_body, TestApp};
use course_catalog::database::{Fault, RowCounts};

#[tokio::test]
async fn material_is_created_with_its_children() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;

    let (status, body) = app.post("/api/v1/materials", Some(&admin), material_body("Rust")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Material created successfully");

    let material = &body["data"];
    assert_eq!(material["learningPoints"], json!(["Ownership", "Traits"]));
    // Topics come back by `order`, not by insertion
    assert_eq!(material["content"][0]["title"], "Ownership");
    assert_eq!(material["content"][1]["title"], "Traits");
    assert_eq!(material["content"][1]["content"], "<p>traits</p>");
    assert_eq!(material["videoCourses"][0]["level"], "beginner");
    assert_eq!(material["videoCourses"][0]["material_id"], material["id"]);

    let (_, list) = app.get("/api/v1/materials", Some(&admin)).await?;
    assert_eq!(list["message"], "Materials found successfully");
    assert_eq!(list["data"][0]["content"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn failed_child_insert_stores_nothing() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    app.store.fail_on(Fault::InsertVideoCourse);

    let (status, body) = app.post("/api/v1/materials", Some(&admin), material_body("Rust")).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error creating material");
    assert_eq!(app.store.row_counts().await, RowCounts::default());

    app.store.clear_faults();
    let (_, list) = app.get("/api/v1/materials", Some(&admin)).await?;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn material_needs_topics_and_videos() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;

    let mut body = material_body("Rust");
    body["content"] = json!([]);
    body["videoCourses"][0]["level"] = json!("expert");
    let (status, response) = app.post("/api/v1/materials", Some(&admin), body).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response["data"]
        .as_array()
        .map(|v| v.iter().filter_map(|f| f["field"].as_str()).collect())
        .unwrap_or_default();
    assert!(fields.contains(&"content"));
    assert!(fields.contains(&"videoCourses[0].level"));
    Ok(())
}

#[tokio::test]
async fn update_replaces_only_the_child_sets_given() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    let (_, created) = app.post("/api/v1/materials", Some(&admin), material_body("Rust")).await?;
    let uri = format!("/api/v1/materials/{}", created["data"]["id"].as_i64().context("id")?);

    let (status, body) = app
        .put(
            &uri,
            Some(&admin),
            json!({
                "lessons": 12,
                "content": [{"title": "Async", "content": "<p>futures</p>", "topics": ["await"]}]
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Material updated successfully");
    assert_eq!(body["data"]["lessons"], 12);
    assert_eq!(body["data"]["title"], "Rust");
    assert_eq!(body["data"]["content"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["content"][0]["title"], "Async");
    assert_eq!(body["data"]["videoCourses"], created["data"]["videoCourses"]);

    // The replaced topics are gone
    let old_topic = format!("/api/v1/content/{}", created["data"]["content"][0]["id"]);
    let (status, _) = app.get(&old_topic, Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_of_missing_material_ignores_the_body() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;

    let (status, body) = app
        .put("/api/v1/materials/424242", Some(&admin), json!({"title": 5}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Material not found");
    Ok(())
}

#[tokio::test]
async fn failed_update_keeps_the_previous_material() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    let (_, created) = app.post("/api/v1/materials", Some(&admin), material_body("Rust")).await?;
    let uri = format!("/api/v1/materials/{}", created["data"]["id"]);

    app.store.fail_on(Fault::InsertContentTopic);
    let (status, body) = app
        .put(
            &uri,
            Some(&admin),
            json!({"title": "Renamed", "content": [{"title": "New", "topics": ["x"]}]}),
        )
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error updating material");

    let (_, shown) = app.get(&uri, Some(&admin)).await?;
    assert_eq!(shown["data"], created["data"]);
    Ok(())
}

#[tokio::test]
async fn delete_cascades_to_children() -> Result<()> {
    let app = TestApp::new()?;
    let admin = app.admin().await?;
    let (_, created) = app.post("/api/v1/materials", Some(&admin), material_body("Rust")).await?;
    let material_id = created["data"]["id"].as_i64().context("id")?;
    let topic = format!("/api/v1/content/{}", created["data"]["content"][0]["id"]);

    let (status, _) = app.get(&topic, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.delete(&format!("/api/v1/materials/{}", material_id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Material deleted successfully");

    let (status, body) = app.get(&topic, Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Content topic not found");

    let (status, body) = app.get(&format!("/api/v1/materials/{}", material_id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Material not found");

    let (_, topics) = app
        .get(&format!("/api/v1/content/material/{}", material_id), Some(&admin))
        .await?;
    assert_eq!(topics["data"], json!([]));
    Ok(())
}
