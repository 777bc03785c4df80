//! Password storage, log-in and the cookie based session guard.

pub(crate) mod cookie;
mod log_in;
mod middleware;
mod password;
mod token;
mod user;

pub use log_in::{post_log_in, post_log_out};
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use token::Token;
pub use user::{create_user_table, get_password_hash, set_password_hash};
