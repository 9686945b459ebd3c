//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, mount prefix
//! matching, header extraction, file serving and access logging.

use crate::config::AppState;
use crate::handler::static_files::{self, RequestConditions, ServeOptions};
use crate::http::{self, response::header_str, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{
    HeaderValue, CONTENT_LENGTH, IF_MODIFIED_SINCE, RANGE, REFERER, SERVER, USER_AGENT,
};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();

    let mut response = route_request(&parts, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.config.logging.access_log {
        let entry = access_entry(&parts, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request(req: &Parts, state: &AppState) -> Response<ResponseBody> {
    // 1. Check HTTP method
    let is_head = match req.method {
        Method::GET => false,
        Method::HEAD => true,
        Method::OPTIONS => return http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", req.method));
            return http::build_405_response();
        }
    };

    // 2. Match the mount prefix
    let Some(relative) = strip_mount_prefix(req.uri.path(), &state.mount_prefix) else {
        return http::build_404_response();
    };

    // 3. Extract headers for caching and range requests
    let headers = &req.headers;
    let conditions = RequestConditions {
        if_modified_since: header_str(headers.get(IF_MODIFIED_SINCE)).map(ToString::to_string),
        range: header_str(headers.get(RANGE)).map(ToString::to_string),
    };
    let options = ServeOptions {
        is_head,
        chunk_size: state.config.files.chunk_size,
    };

    // 4. Serve
    match static_files::serve(&state.document_root, relative, &conditions, options).await {
        Ok(decision) => decision.into_response(&state.mount_prefix, state.redirect_status),
        Err(e) => static_files::error_response(&e),
    }
}

/// Path below the mount prefix, without its leading slash
///
/// Returns `None` when the request is outside the mount.
pub fn strip_mount_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix('/')
}

fn access_entry(
    req: &Parts,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    let headers = &req.headers;
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version)
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = header_str(response.headers().get(CONTENT_LENGTH))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.range = header_str(headers.get(RANGE)).map(ToString::to_string);
    entry.referer = header_str(headers.get(REFERER)).map(ToString::to_string);
    entry.user_agent = header_str(headers.get(USER_AGENT)).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
