// handlers/protected/mod.rs - Catalog handlers (bearer token required)
//
// Route Prefix: /api/v1/{courses,programs,materials,content}
// Middleware: token verification on every route; create/update/delete
// additionally require the admin or mentor role.

pub mod content; // Content topics, listed per material
pub mod course; // Courses, read-through cached
pub mod material; // Materials with their topics and video courses
pub mod program; // Learning programs

pub use content::{content_by_material, content_create, content_delete, content_show, content_update};
pub use course::{course_create, course_delete, course_list, course_show, course_update};
pub use material::{material_create, material_delete, material_list, material_show, material_update};
pub use program::{program_create, program_delete, program_list, program_show, program_update};
