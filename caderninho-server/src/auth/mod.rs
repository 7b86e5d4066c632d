//! Authentication and roles
//!
//! - [`JwtService`] - token issue and validation
//! - [`CurrentUser`] - caller identity taken from the token
//! - [`require_auth`] - global middleware guarding `/api/`
//! - [`require_admin`] - admin-only route layer
//! - [`password`] - argon2 hashing

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, require_admin, require_auth};
