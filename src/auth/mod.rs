//! Authentication primitives.
//!
//! - `session`: HMAC-signed session tokens carried in a cookie
//! - `password`: bcrypt hashing for account passwords
//! - `api_key`: generation and hashing of data-push API keys

pub mod api_key;
pub mod password;
pub mod session;

pub use api_key::{generate_api_key, hash_api_key, GeneratedApiKey};
pub use password::{hash_password, unusable_password_hash, verify_password};
pub use session::{SessionClaims, SessionError, SessionSigner, SESSION_COOKIE};
