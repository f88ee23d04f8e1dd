pub mod auth;
pub mod response;

pub use auth::{authenticate, require_catalog_editor, require_role, CATALOG_EDITORS};
pub use response::{ApiResponse, ApiResult};
