// Protected handlers: mounted under /api behind JWT + session validation.
// Each handler receives `AuthUser` and `AppPool` as request extensions.
pub mod applications;
pub mod auth;
pub mod checkins;
pub mod forum;
pub mod messages;
pub mod profile;
pub mod sessions;
