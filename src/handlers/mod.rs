// Handlers are grouped by the security tier that guards them:
// public (no auth) → protected (session required) → elevated (admin role).
pub mod elevated;
pub mod protected;
pub mod public;
