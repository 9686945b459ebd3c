//! HTTP response building module
//!
//! Builders for each status the file server emits. A builder never fails the
//! request: if assembling the headers fails the error is logged and a bare
//! response with the intended status is returned.

use super::body::{empty, full, ResponseBody};
use super::range::ByteRange;
use hyper::header::{
    HeaderValue, ACCEPT_RANGES, ALLOW, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_RANGE,
    CONTENT_TYPE, LAST_MODIFIED, LOCATION,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Headers describing a file representation
#[derive(Debug, Clone)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub content_encoding: Option<&'a str>,
    pub last_modified: &'a str,
    /// `None` for special files whose size is unknown
    pub content_length: Option<u64>,
}

/// Build 200 OK file response
pub fn build_file_response(headers: &FileHeaders<'_>, body: ResponseBody) -> Response<ResponseBody> {
    finish(
        file_builder(StatusCode::OK, headers),
        body,
        StatusCode::OK,
    )
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    headers: &FileHeaders<'_>,
    range: &ByteRange,
    body: ResponseBody,
) -> Response<ResponseBody> {
    let mut builder = file_builder(StatusCode::PARTIAL_CONTENT, headers);
    if headers.content_length.is_some() {
        builder = builder.header(CONTENT_RANGE, range.content_range());
    }
    finish(builder, body, StatusCode::PARTIAL_CONTENT)
}

/// Build 304 Not Modified response: no body, no Content-Length
pub fn build_304_response(last_modified: &str) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(LAST_MODIFIED, last_modified);
    finish(builder, empty(), StatusCode::NOT_MODIFIED)
}

/// Build redirect response to the canonical location
pub fn build_redirect_response(location: &str, status: StatusCode) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(status)
        .header(LOCATION, location)
        .header(CONTENT_TYPE, "text/plain");
    finish(builder, full("Redirecting..."), status)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, ALLOWED_METHODS);
    finish(
        builder,
        full("405 Method Not Allowed"),
        StatusCode::METHOD_NOT_ALLOWED,
    )
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS);
    finish(builder, empty(), StatusCode::NO_CONTENT)
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64, last_modified: &str) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain")
        .header(LAST_MODIFIED, last_modified)
        .header(CONTENT_RANGE, format!("bytes */{file_size}"));
    finish(
        builder,
        full("416 Range Not Satisfiable"),
        StatusCode::RANGE_NOT_SATISFIABLE,
    )
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn text_response(status: StatusCode, message: &'static str) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain");
    finish(builder, full(message), status)
}

fn file_builder(status: StatusCode, headers: &FileHeaders<'_>) -> Builder {
    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, headers.content_type)
        .header(LAST_MODIFIED, headers.last_modified)
        .header(ACCEPT_RANGES, "bytes");
    if let Some(len) = headers.content_length {
        builder = builder.header(CONTENT_LENGTH, len);
    }
    if let Some(encoding) = headers.content_encoding {
        builder = builder.header(CONTENT_ENCODING, encoding);
    }
    builder
}

fn finish(builder: Builder, body: ResponseBody, status: StatusCode) -> Response<ResponseBody> {
    builder.body(body).unwrap_or_else(|e| {
        crate::logger::log_error(&format!("Failed to build {status} response: {e}"));
        let mut fallback = Response::new(empty());
        *fallback.status_mut() = status;
        fallback
    })
}

/// Header value as `&str`, `None` when absent or not visible ASCII
pub fn header_str(value: Option<&HeaderValue>) -> Option<&str> {
    value.and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn headers() -> FileHeaders<'static> {
        FileHeaders {
            content_type: "text/css",
            content_encoding: None,
            last_modified: "Sun, 06 Nov 1994 08:49:37 GMT",
            content_length: Some(1024),
        }
    }

    #[test]
    fn test_file_response_headers() {
        let resp = build_file_response(&headers(), empty());
        assert_eq!(resp.status(), StatusCode::OK);
        let h = resp.headers();
        assert_eq!(h[CONTENT_TYPE], "text/css");
        assert_eq!(h[CONTENT_LENGTH], "1024");
        assert_eq!(h[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(h[ACCEPT_RANGES], "bytes");
        assert!(h.get(CONTENT_ENCODING).is_none());
    }

    #[test]
    fn test_special_file_has_no_length() {
        let mut fh = headers();
        fh.content_length = None;
        fh.content_encoding = Some("gzip");
        let resp = build_file_response(&fh, empty());
        assert!(resp.headers().get(CONTENT_LENGTH).is_none());
        assert_eq!(resp.headers()[CONTENT_ENCODING], "gzip");
    }

    #[test]
    fn test_partial_response_headers() {
        let range = ByteRange {
            start: 10,
            end: 19,
            total: 1024,
        };
        let mut fh = headers();
        fh.content_length = Some(range.len());
        let resp = build_partial_response(&fh, &range, empty());
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "10");
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 10-19/1024");
    }

    #[tokio::test]
    async fn test_304_is_empty() {
        let resp = build_304_response("Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert!(resp.headers().get(CONTENT_LENGTH).is_none());
        assert_eq!(resp.headers()[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_416_response() {
        let resp = build_416_response(1024, "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes */1024");
        assert_eq!(resp.headers()[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_redirect_response() {
        let resp = build_redirect_response("/static/a.txt", StatusCode::FOUND);
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "/static/a.txt");
    }

    #[test]
    fn test_invalid_header_falls_back() {
        let resp = build_redirect_response("bad\nlocation", StatusCode::FOUND);
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(resp.headers().get(LOCATION).is_none());
    }

    #[test]
    fn test_method_responses() {
        assert_eq!(build_405_response().headers()[ALLOW], "GET, HEAD, OPTIONS");
        assert_eq!(build_options_response().status(), StatusCode::NO_CONTENT);
    }
}
