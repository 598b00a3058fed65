//! Server configuration read from the environment.

use std::env;
use std::net::SocketAddr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Settings for the HTTP server binary.
///
/// - `HOST`: bind host (default: 0.0.0.0)
/// - `PORT`: bind port (default: 8080)
/// - `JWT_SECRET`: HMAC secret for session tokens (required)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| format!("Invalid PORT '{}': {}", raw, e))?,
            Err(_) => DEFAULT_PORT,
        };

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "JWT_SECRET environment variable not set".to_string())?;

        Ok(Self {
            host,
            port,
            jwt_secret,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}
