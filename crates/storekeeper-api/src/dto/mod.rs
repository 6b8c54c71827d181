//! Request and response DTOs
//!
//! Wire format is camelCase. Response DTOs are sanitized: the password
//! hash never appears in any serializable type here.

pub mod auth;
pub mod user;

pub use auth::{LoginRequest, RegisterRequest};
pub use user::{UserDto, UserRequest, UserUpdateRequest};
