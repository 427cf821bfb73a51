//! Server configuration

use std::env;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7272,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `GRAFTON_ADDR` and `GRAFTON_PORT`.
    pub fn from_env() -> Self {
        let defaults = ServerConfig::default();
        let address = env::var("GRAFTON_ADDR").unwrap_or(defaults.address);
        let port = env::var("GRAFTON_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.port);
        ServerConfig { address, port }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
