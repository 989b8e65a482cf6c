//! Request-side helpers shared by the handlers: body, path and query
//! extraction, input validation and paging.

pub mod extract;
pub mod json;
pub mod pagination;
pub mod validate;

pub use extract::{ApiPath, ApiQuery};
pub use json::ApiJson;
pub use pagination::Page;
pub use validate::FieldErrors;
