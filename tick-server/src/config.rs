//! Bootstrap configuration for tick-server
//!
//! Settings come from, in priority order:
//! 1. Command-line arguments (applied by `main`)
//! 2. Environment variables (via clap `env` fallbacks)
//! 3. TOML configuration file (see `tick_common::config::resolve_config_file`)
//! 4. Built-in defaults (below)
//!
//! Nothing here can change while the server is running.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tick_common::config::{load_toml, resolve_config_file};
use tick_common::time::millis_to_duration;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TICK_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: IpAddr,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Pause between two emitted lines, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound on concurrently live streams (unbounded when absent)
    #[serde(default)]
    pub max_streams: Option<usize>,

    /// Maximum lifetime of a single stream, in milliseconds (unbounded when absent)
    #[serde(default)]
    pub stream_timeout_ms: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_bind_addr() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    5780
}

fn default_interval_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            interval_ms: default_interval_ms(),
            max_streams: None,
            stream_timeout_ms: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Locate the configuration file, if any. Tracing is not yet set up when
    /// this runs, so the caller reports the outcome.
    pub fn resolve_source(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        Ok(resolve_config_file(explicit, CONFIG_ENV_VAR)?)
    }

    /// Load `source`, or built-in defaults when there is none
    pub fn from_source(source: Option<&Path>) -> Result<Self> {
        let config = match source {
            Some(path) => load_toml::<ServerConfig>(path)?,
            None => ServerConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the emitter cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(Error::Config("interval_ms must be greater than zero".to_string()));
        }
        if self.max_streams == Some(0) {
            return Err(Error::Config("max_streams must be greater than zero".to_string()));
        }
        if self.stream_timeout_ms == Some(0) {
            return Err(Error::Config("stream_timeout_ms must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Socket address for the listener
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Settings handed to every emission task
    pub fn emitter_settings(&self) -> EmitterSettings {
        EmitterSettings {
            interval: millis_to_duration(self.interval_ms),
            max_streams: self.max_streams,
            stream_timeout: self.stream_timeout_ms.map(millis_to_duration),
        }
    }
}

/// Runtime settings of the task spawner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterSettings {
    pub interval: Duration,
    pub max_streams: Option<usize>,
    pub stream_timeout: Option<Duration>,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        ServerConfig::default().emitter_settings()
    }
}
