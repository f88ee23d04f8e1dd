// handlers/public/root.rs - GET / handler

use axum::response::Json;
use serde_json::{json, Value};

/// Service descriptor with the endpoint map.
pub async fn root_get() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Course catalog API",
        "data": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": ["POST /api/v1/auth/signup", "POST /api/v1/auth/signin"],
                "courses": "/api/v1/courses[/:id]",
                "programs": "/api/v1/programs[/:id]",
                "materials": "/api/v1/materials[/:id]",
                "content": ["/api/v1/content[/:id]", "GET /api/v1/content/material/:material_id"],
                "health": "/health"
            }
        }
    }))
}
