//! Request handler module
//!
//! Request dispatch and the range- and cache-aware static file responder.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
pub use static_files::{serve, RequestConditions, ServeDecision, ServeOptions};
