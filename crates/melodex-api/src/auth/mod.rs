//! Authentication and authorization
//!
//! Bearer-token auth: `jwt` issues and verifies tokens, `middleware` turns a
//! valid token into a [`models::CurrentUser`] request extension, and the
//! role-gate middlewares enforce per-route allow-lists.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::JwtService;
pub use models::CurrentUser;
