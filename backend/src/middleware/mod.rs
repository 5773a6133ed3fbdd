//! Request middleware: JWT authentication and internal-token guard

mod auth;
mod internal;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
pub use internal::internal_auth_middleware;
