//! Error types
//!
//! `ServeError` is the per-request failure taxonomy of the file responder.
//! `ConfigError` covers startup configuration problems.

use std::io;
use std::path::PathBuf;

/// Terminal per-request failure while serving a file
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("\"{}\" does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("directory indexes are not allowed here: {}", .0.display())]
    DirectoryNotAllowed(PathBuf),

    #[error("path escapes the document root: {}", .0.display())]
    OutsideRoot(PathBuf),

    #[error("range not satisfiable for a file of {size} bytes")]
    RangeNotSatisfiable { size: u64, last_modified: String },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration loading or validation failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    Address {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("document root '{}' is not usable: {source}", .path.display())]
    DocumentRoot { path: PathBuf, source: io::Error },

    #[error("document root '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("redirect code {0} is not a redirect status (expected 301, 302, 307 or 308)")]
    RedirectCode(u16),
}
