//! HTTP cache control module
//!
//! `Last-Modified` generation and `If-Modified-Since` matching.
//! Matching is an exact string comparison, so the date is always formatted
//! the same way (IMF-fixdate, whole seconds, GMT).

use std::fs::Metadata;
use std::io;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// File facts read fresh for every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub modified: SystemTime,
    /// False for FIFOs, character devices and other special files
    pub is_regular: bool,
}

impl FileMetadata {
    pub fn from_metadata(metadata: &Metadata) -> io::Result<Self> {
        Ok(Self {
            size: metadata.len(),
            modified: metadata.modified()?,
            is_regular: metadata.is_file(),
        })
    }

    /// `Last-Modified` header value for this file
    pub fn last_modified(&self) -> String {
        http_date(self.modified)
    }
}

/// Last second an HTTP-date can express, 9999-12-31T23:59:59Z
const MAX_HTTP_DATE_SECS: u64 = 253_402_300_799;

/// Format a timestamp as an RFC 7231 HTTP-date
///
/// Times outside 1970..=9999 are clamped into that range.
///
/// # Examples
/// ```
/// use docserve::http::cache::http_date;
/// use std::time::{Duration, UNIX_EPOCH};
///
/// let t = UNIX_EPOCH + Duration::from_secs(784_111_777);
/// assert_eq!(http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn http_date(time: SystemTime) -> String {
    let latest = UNIX_EPOCH + Duration::from_secs(MAX_HTTP_DATE_SECS);
    httpdate::fmt_http_date(time.clamp(UNIX_EPOCH, latest))
}

/// Check if the client's `If-Modified-Since` equals our `Last-Modified`
///
/// Returns true if matched (should return 304), false otherwise. Any other
/// value, including a different valid date, does not match.
pub fn is_not_modified(last_modified: &str, if_modified_since: Option<&str>) -> bool {
    if_modified_since.is_some_and(|client| client == last_modified)
}
