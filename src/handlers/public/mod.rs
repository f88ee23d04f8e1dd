// handlers/public/mod.rs - Public handlers (no authentication)

pub mod auth; // POST /api/v1/auth/signup, /api/v1/auth/signin
pub mod health; // GET /health
pub mod root; // GET /

pub use auth::{signin_post, signup_post};
pub use health::health_get;
pub use root::root_get;
