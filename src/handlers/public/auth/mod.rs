// Token acquisition: sign-up and sign-in both answer with `{ user, session }`.
pub mod signin;
pub mod signup;
pub mod utils;

pub use signin::signin_post;
pub use signup::signup_post;
