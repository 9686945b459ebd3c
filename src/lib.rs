//! docserve: a static file server for a single document root.
//!
//! Requests below the configured mount prefix are mapped onto files under
//! the document root. Responses honour `If-Modified-Since` and single
//! `Range` requests; non-canonical paths are redirected to their canonical
//! spelling and nothing outside the root is ever served.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
