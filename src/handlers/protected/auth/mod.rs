pub mod session;

pub use session::{session_refresh, session_signout, session_whoami};
