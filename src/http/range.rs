//! HTTP Range request parsing module
//!
//! Single `bytes=` ranges only. Multi-range requests and other units are
//! ignored and the whole file is served; out-of-bounds or malformed bounds
//! are rejected with 416 rather than clamped.

/// Inclusive byte window of a file, `start <= end < total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ByteRange {
    /// Number of bytes in the window
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` header value
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(ByteRange),
    /// Bounds outside the file or not numbers - should return 416
    NotSatisfiable,
    /// No Range header or not a single byte range (ignore, return full content)
    None,
}

/// Parse HTTP Range header
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
/// - `bytes=-` - Whole file
///
/// # Examples
/// ```
/// use docserve::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=10-19"), 1024);
/// assert_eq!(
///     result,
///     RangeParseResult::Valid(ByteRange { start: 10, end: 19, total: 1024 })
/// );
///
/// assert_eq!(parse_range_header(None, 1024), RangeParseResult::None);
/// assert_eq!(parse_range_header(Some("bytes=2000-"), 1024), RangeParseResult::NotSatisfiable);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeParseResult::None; // Not bytes unit, ignore
    };

    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    if end_str.contains('-') {
        return RangeParseResult::None;
    }

    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    let bounds = if start_str.is_empty() {
        suffix_bounds(end_str, file_size)
    } else {
        explicit_bounds(start_str, end_str, file_size)
    };

    match bounds {
        Some((start, end)) if start <= end && end < file_size => {
            RangeParseResult::Valid(ByteRange {
                start,
                end,
                total: file_size,
            })
        }
        _ => RangeParseResult::NotSatisfiable,
    }
}

/// `-N`: the last N bytes, the whole file when N exceeds it
///
/// A bare `-` leaves both ends open and covers the whole file.
fn suffix_bounds(suffix_str: &str, file_size: u64) -> Option<(u64, u64)> {
    if suffix_str.is_empty() {
        return file_size.checked_sub(1).map(|end| (0, end));
    }
    let suffix = suffix_str.parse::<u64>().ok()?;
    if suffix == 0 || file_size == 0 {
        return None;
    }
    Some((file_size.saturating_sub(suffix), file_size - 1))
}

/// `a-b` or `a-`
fn explicit_bounds(start_str: &str, end_str: &str, file_size: u64) -> Option<(u64, u64)> {
    let start = start_str.parse::<u64>().ok()?;
    let end = if end_str.is_empty() {
        file_size.checked_sub(1)?
    } else {
        end_str.parse::<u64>().ok()?
    };
    Some((start, end))
}
