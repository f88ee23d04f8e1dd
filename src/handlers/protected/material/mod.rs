// handlers/protected/material/mod.rs - Material CRUD
//
// A material owns its content topics and video courses; every write here
// goes through the store's transactional tree operations.

pub mod create; // POST /api/v1/materials
pub mod delete; // DELETE /api/v1/materials/:id
pub mod list; // GET /api/v1/materials
pub mod show; // GET /api/v1/materials/:id
pub mod update; // PUT /api/v1/materials/:id

pub use create::material_create;
pub use delete::material_delete;
pub use list::material_list;
pub use show::material_show;
pub use update::material_update;

pub(crate) const NOT_FOUND: &str = "Material not found";
