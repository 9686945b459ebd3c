//! HTTP protocol layer module
//!
//! Path resolution, conditional requests, range parsing, content types,
//! bodies and response builders. Independent of routing and the server loop.

pub mod body;
pub mod cache;
pub mod mime;
pub mod path;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::{FileBody, ResponseBody};
pub use path::{DocumentRoot, Resolution};
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_416_response,
    build_500_response, build_options_response, build_redirect_response,
};
