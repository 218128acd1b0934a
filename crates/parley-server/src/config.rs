use parley_auth::config::OAuthConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Minimum length of a configured cookie secret, in bytes.
pub const MIN_COOKIE_SECRET_LEN: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// OAuth 2.0 authorization server settings
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Users and clients created at startup
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if let Some(secret) = &self.server.cookie_secret
            && secret.len() < MIN_COOKIE_SECRET_LEN
        {
            return Err(format!(
                "server.cookie_secret must be at least {MIN_COOKIE_SECRET_LEN} bytes"
            ));
        }
        if let Some(base_url) = &self.server.base_url {
            Url::parse(base_url).map_err(|e| format!("server.base_url is not a URL: {e}"))?;
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // OAuth validation
        self.oauth
            .validate()
            .map_err(|e| format!("oauth config error: {e}"))?;
        // Bootstrap validation
        for client in &self.bootstrap.clients {
            if client.id.is_empty() {
                return Err("bootstrap.clients[].id must not be empty".into());
            }
            if client.confidential && client.secret.as_deref().unwrap_or("").is_empty() {
                return Err(format!(
                    "bootstrap client {} is confidential and needs a secret",
                    client.id
                ));
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    /// Returns the base URL for the server.
    /// If `base_url` is configured, returns that; otherwise computes from host:port.
    pub fn base_url(&self) -> String {
        self.server
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.server.host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL for the server, used as the OAuth issuer.
    /// If not set, defaults to http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,
    /// Secret used to sign session cookies (at least 64 bytes).
    /// If not set, a random key is generated and sessions do not survive a restart.
    #[serde(default)]
    pub cookie_secret: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            cookie_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Data created on startup so a fresh server is usable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub users: Vec<BootstrapUser>,
    #[serde(default)]
    pub clients: Vec<BootstrapClient>,
}

/// A user to create at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapUser {
    pub name: String,
    /// Plain text password (hashed before storage).
    /// Prefer PARLEY__BOOTSTRAP__... env vars over committing it to a file.
    pub password: String,
}

/// A client to register at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapClient {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub confidential: bool,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Space-separated maximum scopes.
    #[serde(default)]
    pub scopes: String,
    /// Owning user name; defaults to "system".
    #[serde(default)]
    pub creator: Option<String>,
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or("parley.toml"));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., PARLEY__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("PARLEY")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
