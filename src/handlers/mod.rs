// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token; writes also need an editor role)

pub mod public; // /, /health, /api/v1/auth/*
pub mod protected; // /api/v1/{courses,programs,materials,content}
pub mod utils;

pub use protected::*;
pub use public::*;
