//! Application configuration.
//!
//! Defaults, overridden by environment variables, overridden in turn by
//! CLI arguments in `main`.

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Credential that resolves to an admin authorization context.
    pub admin_token: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8002,
            admin_token: "admin".into(),
        }
    }
}

impl AppConfig {
    /// Build config from environment variables over the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("AUCTION_SERVER_HOST").unwrap_or(defaults.host),
            port: std::env::var("AUCTION_SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            admin_token: std::env::var("AUCTION_ADMIN_TOKEN").unwrap_or(defaults.admin_token),
        }
    }

    /// Whether the admin credential was left at its insecure default.
    pub fn default_admin_token(&self) -> bool {
        self.admin_token == "admin"
    }

    /// Get bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
