//! Credential primitives for Yatube: Argon2id password hashing and
//! HS256-signed session tokens.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, SessionKeys};
pub use password::{hash_password, verify_password, PasswordError};
