//! HTTP server, session and bootstrap configuration.

use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port for the HTTP API.
    pub port: u16,
    /// HMAC key for session tokens.
    pub session_secret: String,
    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,
    /// Mark the session cookie `Secure` (set behind TLS).
    pub cookie_secure: bool,
    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,
    /// Origins allowed by CORS. Empty disables the CORS layer.
    pub cors_origins: Vec<String>,
    /// Admin account created at startup when no user has this email.
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            session_secret: String::new(),
            session_ttl_secs: 7 * 24 * 60 * 60,
            cookie_secure: false,
            bcrypt_cost: 12,
            cors_origins: Vec::new(),
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
