// handlers/protected/content/mod.rs - Content topic CRUD

pub mod by_material; // GET /api/v1/content/material/:material_id
pub mod create; // POST /api/v1/content
pub mod delete; // DELETE /api/v1/content/:id
pub mod show; // GET /api/v1/content/:id
pub mod update; // PUT /api/v1/content/:id

pub use by_material::content_by_material;
pub use create::content_create;
pub use delete::content_delete;
pub use show::content_show;
pub use update::content_update;

pub(crate) const NOT_FOUND: &str = "Content topic not found";
