//! Server settings read from `TIMETABLE__*` environment variables, after an
//! optional `.env` file has been loaded.

use anyhow::{bail, Context};
use std::net::SocketAddr;

const PREFIX: &str = "TIMETABLE__";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub body_limit: usize,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            body_limit: 2 * 1024 * 1024,
            log_format: LogFormat::Json,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which receives full variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(&format!("{PREFIX}{name}"));
        let mut cfg = Self::default();

        if let Some(port) = var("SERVER__PORT") {
            cfg.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid {PREFIX}SERVER__PORT {port:?}"))?;
        }
        if let Some(limit) = var("SERVER__BODY_LIMIT") {
            cfg.body_limit = limit
                .trim()
                .parse()
                .with_context(|| format!("invalid {PREFIX}SERVER__BODY_LIMIT {limit:?}"))?;
        }
        if let Some(format) = var("LOG__FORMAT") {
            cfg.log_format = match format.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => bail!("unknown {PREFIX}LOG__FORMAT {other:?}, expected json or pretty"),
            };
        }
        Ok(cfg)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
