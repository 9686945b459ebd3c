// Application state module
// Immutable per-process state shared by every connection

use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Config;
use crate::error::ConfigError;
use crate::http::DocumentRoot;
use hyper::StatusCode;

/// Application state
pub struct AppState {
    pub config: Config,
    pub document_root: DocumentRoot,
    /// Mount prefix without trailing slash ("" for the root mount)
    pub mount_prefix: String,
    pub redirect_status: StatusCode,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    /// Validate configuration and resolve the document root
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let document_root = DocumentRoot::new(&config.files.document_root)?;
        let redirect_status = config.redirect_status()?;
        let mount_prefix = config.mount_prefix();

        Ok(Self {
            config,
            document_root,
            mount_prefix,
            redirect_status,
            active_connections: AtomicUsize::new(0),
        })
    }

    pub fn connection_count(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
