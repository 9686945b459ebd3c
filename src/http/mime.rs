//! MIME type detection module
//!
//! Returns the Content-Type (and Content-Encoding for compressed files) based
//! on the file name. Nothing here looks at the bytes themselves.

use std::path::Path;

/// Fallback for unknown extensions
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Guessed representation metadata for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentType {
    pub mime: &'static str,
    pub encoding: Option<&'static str>,
}

/// Guess type and encoding from a file name
///
/// A compression suffix sets the encoding and the type comes from the
/// extension underneath it, so `data.tar.gz` is `application/x-tar` with
/// `gzip` encoding.
///
/// # Examples
/// ```
/// use docserve::http::mime::guess_type;
///
/// let ct = guess_type("static/style.css".as_ref());
/// assert_eq!(ct.mime, "text/css");
/// assert_eq!(ct.encoding, None);
///
/// let ct = guess_type("backup.tar.gz".as_ref());
/// assert_eq!(ct.mime, "application/x-tar");
/// assert_eq!(ct.encoding, Some("gzip"));
/// ```
pub fn guess_type(path: &Path) -> ContentType {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return ContentType {
            mime: DEFAULT_CONTENT_TYPE,
            encoding: None,
        };
    };
    let name = name.to_ascii_lowercase();

    // svgz is shorthand for svg.gz
    let name = match name.strip_suffix(".svgz") {
        Some(stem) => format!("{stem}.svg.gz"),
        None => name,
    };

    let (stem, encoding) = match name.rsplit_once('.') {
        Some((stem, ext)) => match get_encoding(ext) {
            Some(enc) => (stem, Some(enc)),
            None => (name.as_str(), None),
        },
        None => (name.as_str(), None),
    };

    let extension = stem.rsplit_once('.').map(|(_, ext)| ext);
    ContentType {
        mime: get_content_type(extension).unwrap_or(DEFAULT_CONTENT_TYPE),
        encoding,
    }
}

/// Content-Encoding implied by a compression suffix
pub fn get_encoding(extension: &str) -> Option<&'static str> {
    match extension {
        "gz" => Some("gzip"),
        "z" => Some("compress"),
        "bz2" => Some("bzip2"),
        "xz" => Some("xz"),
        "br" => Some("br"),
        _ => None,
    }
}

/// Get MIME Content-Type based on file extension
pub fn get_content_type(extension: Option<&str>) -> Option<&'static str> {
    let content_type = match extension? {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Archives and documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "iso" => "application/x-iso9660-image",

        _ => return None,
    };
    Some(content_type)
}
