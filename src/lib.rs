pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod validation;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::{authenticate, require_catalog_editor};
use crate::state::AppState;

/// Builds the full HTTP surface over `state`.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .merge(catalog_routes(state.clone()));

    Router::new()
        // Public
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .nest("/api/v1", api)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(public::signup_post))
        .route("/signin", post(public::signin_post))
}

/// Every catalog route needs a valid token; writes also need an editor role.
fn catalog_routes(state: AppState) -> Router<AppState> {
    let readers = Router::new()
        .route("/courses", get(protected::course_list))
        .route("/courses/:id", get(protected::course_show))
        .route("/programs", get(protected::program_list))
        .route("/programs/:id", get(protected::program_show))
        .route("/materials", get(protected::material_list))
        .route("/materials/:id", get(protected::material_show))
        .route("/content/material/:material_id", get(protected::content_by_material))
        .route("/content/:id", get(protected::content_show));

    let editors = Router::new()
        .route("/courses", post(protected::course_create))
        .route(
            "/courses/:id",
            put(protected::course_update).delete(protected::course_delete),
        )
        .route("/programs", post(protected::program_create))
        .route(
            "/programs/:id",
            put(protected::program_update).delete(protected::program_delete),
        )
        .route("/materials", post(protected::material_create))
        .route(
            "/materials/:id",
            put(protected::material_update).delete(protected::material_delete),
        )
        .route("/content", post(protected::content_create))
        .route(
            "/content/:id",
            put(protected::content_update).delete(protected::content_delete),
        )
        .route_layer(from_fn(require_catalog_editor));

    readers
        .merge(editors)
        .route_layer(from_fn_with_state(state, authenticate))
}
