#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use course_catalog::auth::{PasswordHasher, TokenIssuer};
use course_catalog::cache::Cache;
use course_catalog::database::MemoryStore;
use course_catalog::state::AppState;

pub const SECRET: &str = "integration-test-secret";

/// The real router over an in-memory store and a local cache.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub cache: Cache,
    pub tokens: TokenIssuer,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let store = MemoryStore::new();
        let cache = Cache::local(Duration::from_secs(60));
        let tokens = TokenIssuer::new(SECRET, chrono::Duration::hours(1));
        // Cheap argon2 parameters keep the suite fast
        let passwords = PasswordHasher::new(8, 1, 1)?;

        let state = AppState::new(Arc::new(store.clone()), cache.clone(), tokens.clone(), passwords);
        Ok(Self {
            router: course_catalog::app(state),
            store,
            cache,
            tokens,
        })
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, value))
    }

    /// Posts `raw` verbatim as a JSON body.
    pub async fn post_raw(&self, uri: &str, token: Option<&str>, raw: &'static str) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = self.router.clone().oneshot(builder.body(Body::from(raw))?).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Registers an account and returns its token.
    pub async fn signup(&self, email: &str, role: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/api/v1/auth/signup",
                None,
                json!({
                    "email": email,
                    "password": "secret123",
                    "full_name": "Test User",
                    "role": role
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "signup failed: {} {}", status, body);
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("signup returned no token")
    }

    pub async fn admin(&self) -> Result<String> {
        self.signup("admin@example.com", "admin").await
    }

    pub async fn student(&self) -> Result<String> {
        self.signup("student@example.com", "student").await
    }
}

pub fn course_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "An introduction",
        "instructor": "Ada Lovelace",
        "duration": 10,
        "price": 49.5
    })
}

pub fn program_body(title: &str) -> Value {
    json!({
        "title": title,
        "type": "intensive",
        "duration": "3 months",
        "price": 990.0,
        "features": ["Mentoring", "Certificate"]
    })
}

pub fn material_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Programming in Rust",
        "icon": "rust.svg",
        "duration": 20,
        "lessons": 8,
        "learningPoints": ["Ownership", "Traits"],
        "content": [
            {"title": "Traits", "content": "<p>traits</p>", "topics": ["dyn", "impl"], "order": 2},
            {"title": "Ownership", "content": "<p>own</p>", "topics": ["moves"], "order": 1}
        ],
        "videoCourses": [
            {
                "title": "Rust in an hour",
                "description": "Crash course",
                "youtube_id": "abc123",
                "duration": "1h",
                "instructor": "Ferris",
                "level": "beginner"
            }
        ]
    })
}
