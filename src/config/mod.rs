//! Server configuration
//!
//! Every setting comes from a command-line flag with an environment
//! variable fallback, then a compiled-in default.

use crate::conversion::limits::{DEFAULT_BODY_LIMIT, MIN_BODY_LIMIT};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default tracing filter when neither `--log-filter` nor `RUST_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "toon_gateway=info,tower_http=info";

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration rejected before the listener is bound
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Port must be non-zero")]
    InvalidPort,

    #[error("Body limit of {limit} bytes is below the minimum of {min} bytes")]
    BodyLimitTooSmall { limit: usize, min: usize },

    #[error("Log filter must not be empty")]
    EmptyLogFilter,
}

/// TOON Converter API gateway
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "toon-gateway", version)]
#[command(about = "HTTP gateway converting between JSON and TOON (Token-Oriented Object Notation)")]
pub struct GatewayConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum request body size in bytes
    #[arg(long, env = "BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,

    /// Tracing filter directives, e.g. "toon_gateway=debug"
    #[arg(long, env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            body_limit: DEFAULT_BODY_LIMIT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.body_limit < MIN_BODY_LIMIT {
            return Err(ConfigError::BodyLimitTooSmall {
                limit: self.body_limit,
                min: MIN_BODY_LIMIT,
            });
        }

        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }

        Ok(())
    }
}
