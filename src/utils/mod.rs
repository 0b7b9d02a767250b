pub mod cookie;
pub mod jwt;
pub mod password;

pub use jwt::{encode_access_token, encode_refresh_token};
pub use password::{hash_password, validate_password_strength, verify_password};
