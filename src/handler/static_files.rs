//! Static file serving module
//!
//! Resolves a request path, negotiates the conditional and range headers, and
//! opens the file for streaming. `serve` decides; `ServeDecision::into_response`
//! and `error_response` turn the outcome into an HTTP response.

use crate::error::ServeError;
use crate::http::cache::{self, FileMetadata};
use crate::http::mime::{self, ContentType};
use crate::http::path::{CanonicalPath, DocumentRoot, Resolution};
use crate::http::range::{parse_range_header, ByteRange, RangeParseResult};
use crate::http::response::{self, FileHeaders};
use crate::http::{body, FileBody, ResponseBody};
use crate::logger;
use hyper::{Response, StatusCode};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::AsyncSeekExt;

/// Request headers that influence how a file is served
#[derive(Debug, Clone, Default)]
pub struct RequestConditions {
    pub if_modified_since: Option<String>,
    pub range: Option<String>,
}

/// Per-request serving options
#[derive(Debug, Clone, Copy)]
pub struct ServeOptions {
    /// HEAD request: headers only, the file is never opened
    pub is_head: bool,
    pub chunk_size: usize,
}

/// A file about to be sent
pub struct FileResponse {
    pub content_type: ContentType,
    pub last_modified: String,
    /// Only known for regular files
    pub content_length: Option<u64>,
    /// `None` for HEAD requests
    pub body: Option<FileBody>,
}

impl std::fmt::Debug for FileResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileResponse")
            .field("content_type", &self.content_type)
            .field("last_modified", &self.last_modified)
            .field("content_length", &self.content_length)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Terminal outcome of serving one request
#[derive(Debug)]
pub enum ServeDecision {
    /// Client must re-request the canonical path
    Redirect(CanonicalPath),
    /// `If-Modified-Since` matched; nothing was opened
    NotModified { last_modified: String },
    /// Whole file, status 200
    Ok(FileResponse),
    /// Single byte range, status 206
    PartialContent(FileResponse, ByteRange),
}

/// Serve `raw_path` (URL-encoded, relative to the document root)
pub async fn serve(
    root: &DocumentRoot,
    raw_path: &str,
    conditions: &RequestConditions,
    options: ServeOptions,
) -> Result<ServeDecision, ServeError> {
    let resolved = match root.resolve(raw_path).await? {
        Resolution::Redirect(canonical) => return Ok(ServeDecision::Redirect(canonical)),
        Resolution::File(resolved) => resolved,
    };

    let metadata = FileMetadata::from_metadata(&resolved.metadata)?;
    let last_modified = metadata.last_modified();

    if cache::is_not_modified(&last_modified, conditions.if_modified_since.as_deref()) {
        return Ok(ServeDecision::NotModified { last_modified });
    }

    let content_type = mime::guess_type(&resolved.path);

    let range = match parse_range_header(conditions.range.as_deref(), metadata.size) {
        RangeParseResult::Valid(range) => Some(range),
        RangeParseResult::None => None,
        RangeParseResult::NotSatisfiable => {
            return Err(ServeError::RangeNotSatisfiable {
                size: metadata.size,
                last_modified,
            });
        }
    };

    let content_length = metadata
        .is_regular
        .then(|| range.map_or(metadata.size, |r| r.len()));

    let body = if options.is_head {
        None
    } else {
        Some(open_body(&resolved.path, range, options.chunk_size).await?)
    };

    let file = FileResponse {
        content_type,
        last_modified,
        content_length,
        body,
    };

    Ok(match range {
        Some(range) => ServeDecision::PartialContent(file, range),
        None => ServeDecision::Ok(file),
    })
}

/// Open the file positioned at the first byte to send
async fn open_body(
    path: &std::path::Path,
    range: Option<ByteRange>,
    chunk_size: usize,
) -> std::io::Result<FileBody> {
    let mut file = File::open(path).await?;
    match range {
        Some(range) => {
            file.seek(SeekFrom::Start(range.start)).await?;
            Ok(FileBody::bounded(file, range.len(), chunk_size))
        }
        None => Ok(FileBody::whole(file, chunk_size)),
    }
}

impl FileResponse {
    /// Headers and body, the body empty for HEAD requests
    fn into_parts(self) -> (ContentType, String, Option<u64>, ResponseBody) {
        let body = self.body.map_or_else(body::empty, FileBody::boxed);
        (self.content_type, self.last_modified, self.content_length, body)
    }
}

impl ServeDecision {
    /// Build the response, streaming the file body when there is one
    ///
    /// `mount_prefix` is prepended to redirect locations.
    pub fn into_response(
        self,
        mount_prefix: &str,
        redirect_status: StatusCode,
    ) -> Response<ResponseBody> {
        match self {
            Self::Redirect(canonical) => {
                let location = format!("{mount_prefix}/{}", canonical.to_url_path());
                response::build_redirect_response(&location, redirect_status)
            }
            Self::NotModified { last_modified } => response::build_304_response(&last_modified),
            Self::Ok(file) => {
                let (content_type, last_modified, content_length, body) = file.into_parts();
                let headers = file_headers(&content_type, &last_modified, content_length);
                response::build_file_response(&headers, body)
            }
            Self::PartialContent(file, range) => {
                let (content_type, last_modified, content_length, body) = file.into_parts();
                let headers = file_headers(&content_type, &last_modified, content_length);
                response::build_partial_response(&headers, &range, body)
            }
        }
    }
}

fn file_headers<'a>(
    content_type: &ContentType,
    last_modified: &'a str,
    content_length: Option<u64>,
) -> FileHeaders<'a> {
    FileHeaders {
        content_type: content_type.mime,
        content_encoding: content_type.encoding,
        last_modified,
        content_length,
    }
}

/// Convert a serving failure into a response
pub fn error_response(err: &ServeError) -> Response<ResponseBody> {
    match err {
        ServeError::NotFound(_) | ServeError::DirectoryNotAllowed(_) | ServeError::OutsideRoot(_) => {
            tracing::debug!("{err}");
            response::build_404_response()
        }
        ServeError::RangeNotSatisfiable {
            size,
            last_modified,
        } => response::build_416_response(*size, last_modified),
        ServeError::Io(e) => {
            logger::log_error(&format!("Failed to open file: {e}"));
            response::build_500_response()
        }
    }
}
