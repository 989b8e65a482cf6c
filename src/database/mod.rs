pub mod manager;
pub mod models;
pub mod schema;

// Query modules, one per table family
pub mod accounts;
pub mod applications;
pub mod checkins;
pub mod counseling;
pub mod forum;
pub mod messages;
pub mod profiles;

pub use manager::{DatabaseError, DatabaseManager};
