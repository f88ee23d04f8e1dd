// handlers/protected/program/mod.rs - Program CRUD

pub mod create; // POST /api/v1/programs
pub mod delete; // DELETE /api/v1/programs/:id
pub mod list; // GET /api/v1/programs
pub mod show; // GET /api/v1/programs/:id
pub mod update; // PUT /api/v1/programs/:id

pub use create::program_create;
pub use delete::program_delete;
pub use list::program_list;
pub use show::program_show;
pub use update::program_update;

pub(crate) const NOT_FOUND: &str = "Program not found";
