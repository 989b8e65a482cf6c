pub mod applications;
pub mod posts;
pub mod users;

pub use applications::{application_approve, application_reject, applications_get};
pub use posts::{comment_approval, post_approval};
pub use users::{user_role_put, users_get};
