// Configuration module entry point
// Loads configuration and builds the shared runtime state

mod state;
mod types;

use crate::error::ConfigError;
use hyper::StatusCode;
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, FilesConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// The file is optional; `DOCSERVE_` environment variables override it,
    /// using `__` between nested keys (`DOCSERVE_FILES__DOCUMENT_ROOT`).
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("DOCSERVE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("files.document_root", ".")?
            .set_default("files.url_prefix", "/")?
            .set_default("files.redirect_code", 302)?
            .set_default("files.chunk_size", 65_536)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.shutdown_grace", 5)?
            .set_default("http.server_name", concat!("docserve/", env!("CARGO_PKG_VERSION")))?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| ConfigError::Address { addr, source })
    }

    /// Redirect status, restricted to the redirect codes that keep GET
    pub fn redirect_status(&self) -> Result<StatusCode, ConfigError> {
        match self.files.redirect_code {
            301 => Ok(StatusCode::MOVED_PERMANENTLY),
            302 => Ok(StatusCode::FOUND),
            307 => Ok(StatusCode::TEMPORARY_REDIRECT),
            308 => Ok(StatusCode::PERMANENT_REDIRECT),
            other => Err(ConfigError::RedirectCode(other)),
        }
    }

    /// Mount prefix without trailing slash; the root mount is ""
    pub fn mount_prefix(&self) -> String {
        let trimmed = self.files.url_prefix.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}
