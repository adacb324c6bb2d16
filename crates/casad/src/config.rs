//! Daemon configuration (TOML)
//!
//! ```toml
//! [server]
//! port = 8085
//!
//! [gateway_client]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [[session]]
//! token = "long-lived-bearer-token"
//! gateway = "https://gateway.local"
//! user_id = "household-1"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway_client: GatewayClientConfig,
    #[serde(default, rename = "session")]
    pub sessions: Vec<SessionConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    8085
}

#[derive(Debug, Deserialize)]
pub struct GatewayClientConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for GatewayClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// One authorized client: the token it presents and the gateway it maps to
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub token: String,
    pub gateway: String,
    /// Stable account id reported to the assistant; defaults to the
    /// gateway URL when omitted
    pub user_id: Option<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;

        if config.sessions.is_empty() {
            anyhow::bail!("config has no [[session]] entries; the bridge cannot serve anyone");
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_client.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_client.connect_timeout_secs)
    }
}
