// Elevated handlers: mounted under /api/admin. Session validation runs first,
// then `require_admin_middleware` rejects every role but admin with 403.
pub mod admin;
