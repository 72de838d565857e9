//! Typed application configuration.
//!
//! The framework itself takes a fully-built [`AppConfig`] value; nothing in
//! the core reads files or the environment. [`AppConfig::load`] is the
//! application-side convenience that layers an optional `riffle` config file
//! and `RIFFLE`-prefixed environment variables over the defaults.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub resources: ResourceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub pool_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResourceConfig {
    /// Directory served for static asset paths.
    pub static_root: String,
    /// Directory the template engine reads views from.
    pub views_root: String,
    /// URL prefixes resolved against `static_root` instead of the router.
    #[serde(default = "default_static_prefixes")]
    pub static_prefixes: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit a request/response line for every dispatched request.
    pub access_log: bool,
}

fn default_static_prefixes() -> Vec<String> {
    vec![
        "/css/".to_string(),
        "/js/".to_string(),
        "/images/".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            workers: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: String::new(),
            pool_size: 5,
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            static_root: "public".to_string(),
            views_root: "views".to_string(),
            static_prefixes: default_static_prefixes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { access_log: false }
    }
}

impl AppConfig {
    /// Load configuration from `riffle.{toml,json,...}` (optional) and the
    /// environment, falling back to the documented defaults.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("riffle").required(false))
            .add_source(config::Environment::with_prefix("RIFFLE").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 3306)?
            .set_default("database.user", "root")?
            .set_default("database.password", "")?
            .set_default("database.database", "")?
            .set_default("database.pool_size", 5)?
            .set_default("resources.static_root", "public")?
            .set_default("resources.views_root", "views")?
            .set_default("logging.access_log", false)?
            .build()?;

        settings.try_deserialize().map_err(Error::from)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| Error::Addr { addr, source })
    }
}
