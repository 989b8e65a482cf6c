// Public handlers: no session required. Token acquisition and service info.
pub mod auth;
pub mod home;
