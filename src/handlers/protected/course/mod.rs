// handlers/protected/course/mod.rs - Course CRUD
//
// Reads go through the cache; every write invalidates the list key and,
// for update/delete, the record's own key.

pub mod create; // POST /api/v1/courses
pub mod delete; // DELETE /api/v1/courses/:id
pub mod list; // GET /api/v1/courses
pub mod show; // GET /api/v1/courses/:id
pub mod update; // PUT /api/v1/courses/:id

pub use create::course_create;
pub use delete::course_delete;
pub use list::course_list;
pub use show::course_show;
pub use update::course_update;

pub(crate) const NOT_FOUND: &str = "Course not found";
