//! Request path resolution module
//!
//! Turns an untrusted, URL-encoded request path into a file path confined to
//! the document root. Normalization is lexical; confinement is re-checked on
//! the canonicalized filesystem path so symlinks cannot lead outside the root.

use crate::error::{ConfigError, ServeError};
use crate::logger;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Characters escaped when a canonical path is written back into a URL
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Lexically canonical form of a decoded request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath {
    path: String,
    redirect: bool,
}

impl CanonicalPath {
    /// Canonical path relative to the document root, `/`-separated
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Whether the client should be sent to the canonical form instead
    pub const fn needs_redirect(&self) -> bool {
        self.redirect
    }

    /// Canonical path with URL-reserved characters escaped again
    pub fn to_url_path(&self) -> String {
        utf8_percent_encode(&self.path, PATH_SEGMENT).to_string()
    }
}

/// Outcome of resolving a request path against the document root
#[derive(Debug)]
pub enum Resolution {
    /// Regular (or special) file inside the root, with fresh metadata
    File(ResolvedPath),
    /// Request must be repeated with the canonical path
    Redirect(CanonicalPath),
}

/// File path confined to the document root
#[derive(Debug)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub metadata: Metadata,
}

/// Percent-decode a raw request path; invalid UTF-8 is replaced lossily
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// POSIX `normpath`: collapse separators, drop `.`, fold `..` lexically
///
/// `..` directly under an absolute root is dropped; at the start of a
/// relative path it is kept. An empty result becomes `.`.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    // POSIX leaves exactly two leading slashes alone
    let initial = if path.starts_with("//") && !path.starts_with("///") {
        "//"
    } else if absolute {
        "/"
    } else {
        ""
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if (!absolute && parts.is_empty()) || parts.last() == Some(&"..") {
                    parts.push("..");
                } else {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }

    let normalized = format!("{initial}{}", parts.join("/"));
    if normalized.is_empty() {
        ".".to_string()
    } else {
        normalized
    }
}

/// Build the canonical form of an already decoded request path
///
/// # Examples
/// ```
/// use docserve::http::path::canonicalize;
///
/// let canonical = canonicalize("../../etc/passwd");
/// assert_eq!(canonical.as_str(), "etc/passwd");
/// assert!(canonical.needs_redirect());
///
/// assert!(!canonicalize("/css/site.css").needs_redirect());
/// ```
pub fn canonicalize(decoded: &str) -> CanonicalPath {
    let normalized = normalize(decoded);
    let stripped = normalized.trim_start_matches('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in stripped.split('/') {
        if segment.is_empty() {
            continue;
        }
        let segment = strip_drive(last_component(segment));
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        segments.push(segment);
    }

    let path = segments.join("/");
    let redirect = !path.is_empty() && path != stripped;
    CanonicalPath { path, redirect }
}

/// Drop any number of leading drive-letter prefixes such as `C:`
fn strip_drive(mut segment: &str) -> &str {
    while let [letter, b':', ..] = segment.as_bytes() {
        if !letter.is_ascii_alphabetic() {
            break;
        }
        segment = &segment[2..];
    }
    segment
}

/// Final component of a segment when backslash is a separator
#[cfg(windows)]
fn last_component(segment: &str) -> &str {
    segment.rsplit('\\').next().unwrap_or(segment)
}

#[cfg(not(windows))]
const fn last_component(segment: &str) -> &str {
    segment
}

/// Canonicalized document root shared by all requests
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
}

impl DocumentRoot {
    /// Canonicalize and validate the configured root directory
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let root = path
            .canonicalize()
            .map_err(|source| ConfigError::DocumentRoot {
                path: path.to_path_buf(),
                source,
            })?;
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory(root));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a raw (still URL-encoded) request path
    pub async fn resolve(&self, raw: &str) -> Result<Resolution, ServeError> {
        let canonical = canonicalize(&decode_path(raw));
        if canonical.needs_redirect() {
            return Ok(Resolution::Redirect(canonical));
        }

        let joined = self.root.join(canonical.as_str());

        // Missing, unreadable and ENOTDIR all look the same to the client
        let Ok(real) = fs::canonicalize(&joined).await else {
            return Err(ServeError::NotFound(joined));
        };

        if !real.starts_with(&self.root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {raw} -> {}",
                real.display()
            ));
            return Err(ServeError::OutsideRoot(joined));
        }

        let Ok(metadata) = fs::metadata(&real).await else {
            return Err(ServeError::NotFound(joined));
        };
        if metadata.is_dir() {
            return Err(ServeError::DirectoryNotAllowed(real));
        }

        Ok(Resolution::File(ResolvedPath {
            path: real,
            metadata,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), ".");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("a//b/./c"), "a/b/c");
        assert_eq!(normalize("/a/../../secret"), "/secret");
        assert_eq!(normalize("a/../../secret"), "../secret");
        assert_eq!(normalize("//a"), "//a");
        assert_eq!(normalize("///a/"), "/a");
        assert_eq!(normalize("a/.."), ".");
    }

    #[test]
    fn test_canonical_paths_pass_through() {
        let c = canonicalize("style.css");
        assert_eq!(c.as_str(), "style.css");
        assert!(!c.needs_redirect());

        let c = canonicalize("/static/css/site.css");
        assert_eq!(c.as_str(), "static/css/site.css");
        assert!(!c.needs_redirect());
    }

    #[test]
    fn test_lexically_folded_paths_do_not_redirect() {
        // normpath already folds these, so the canonical form equals the input
        let c = canonicalize("a/./b//c");
        assert_eq!(c.as_str(), "a/b/c");
        assert!(!c.needs_redirect());

        let c = canonicalize("/a/../../secret");
        assert_eq!(c.as_str(), "secret");
        assert!(!c.needs_redirect());
    }

    #[test]
    fn test_traversal_redirects() {
        let c = canonicalize("../../etc/passwd");
        assert_eq!(c.as_str(), "etc/passwd");
        assert!(c.needs_redirect());
    }

    #[test]
    fn test_drive_letters_stripped() {
        let c = canonicalize("C:/windows/win.ini");
        assert_eq!(c.as_str(), "windows/win.ini");
        assert!(c.needs_redirect());

        let c = canonicalize("a/C:D:b");
        assert_eq!(c.as_str(), "a/b");
        assert!(c.needs_redirect());
    }

    #[test]
    fn test_root_is_empty_without_redirect() {
        for input in ["", "/", ".", "/..", "./"] {
            let c = canonicalize(input);
            assert_eq!(c.as_str(), "", "input {input:?}");
            assert!(!c.needs_redirect(), "input {input:?}");
        }
    }

    #[test]
    fn test_decode_then_canonicalize() {
        let decoded = decode_path("%2e%2e/%2e%2e/secret%20file.txt");
        assert_eq!(decoded, "../../secret file.txt");
        let c = canonicalize(&decoded);
        assert_eq!(c.as_str(), "secret file.txt");
        assert!(c.needs_redirect());
        assert_eq!(c.to_url_path(), "secret%20file.txt");
    }

    #[test]
    fn test_url_path_survives_decoding() {
        let c = canonicalize(&decode_path("../100%25.txt"));
        assert_eq!(c.as_str(), "100%.txt");
        let again = canonicalize(&decode_path(&c.to_url_path()));
        assert_eq!(again, CanonicalPath { path: "100%.txt".into(), redirect: false });
    }

    proptest! {
        #[test]
        fn prop_canonicalize_is_idempotent(input in "[a-zA-Z0-9./:%\\\\]{0,40}") {
            let first = canonicalize(&input);
            let second = canonicalize(first.as_str());
            prop_assert_eq!(second.as_str(), first.as_str());
            prop_assert!(!second.needs_redirect());
        }

        #[test]
        fn prop_canonical_has_no_dot_segments(input in "(\\.\\.?|[a-z]{1,3}|/|C:)*") {
            let c = canonicalize(&input);
            prop_assert!(!c.as_str().starts_with('/'));
            for segment in c.as_str().split('/').filter(|s| !s.is_empty()) {
                prop_assert!(segment != "." && segment != "..");
            }
        }

        #[test]
        fn prop_lexical_join_stays_in_root(input in "(\\.\\./|\\./|/|[a-z]{1,4}/?|%2e%2e/)*") {
            let root = Path::new("/srv/www");
            let c = canonicalize(&decode_path(&input));
            let joined = root.join(c.as_str());
            prop_assert!(joined.starts_with(root));
        }
    }

    #[tokio::test]
    async fn test_resolve_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), b"hello").unwrap();
        let root = DocumentRoot::new(dir.path()).unwrap();

        match root.resolve("hello.txt").await.unwrap() {
            Resolution::File(resolved) => {
                assert!(resolved.path.starts_with(root.path()));
                assert_eq!(resolved.metadata.len(), 5);
            }
            Resolution::Redirect(c) => panic!("unexpected redirect to {c:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_missing_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let root = DocumentRoot::new(dir.path()).unwrap();

        assert!(matches!(
            root.resolve("nope.txt").await,
            Err(ServeError::NotFound(_))
        ));
        assert!(matches!(
            root.resolve("sub").await,
            Err(ServeError::DirectoryNotAllowed(_))
        ));
        assert!(matches!(
            root.resolve("").await,
            Err(ServeError::DirectoryNotAllowed(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_traversal() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret"), b"top secret").unwrap();
        let docs = outer.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        let root = DocumentRoot::new(&docs).unwrap();

        // absolute form folds the dots away and stays under the root
        assert!(matches!(
            root.resolve("/a/../../secret").await,
            Err(ServeError::NotFound(p)) if p.starts_with(root.path())
        ));
        // relative form is redirected to its canonical spelling
        match root.resolve("%2e%2e/secret").await.unwrap() {
            Resolution::Redirect(c) => assert_eq!(c.as_str(), "secret"),
            Resolution::File(f) => panic!("served {}", f.path.display()),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_symlink_escape() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret"), b"top secret").unwrap();
        let docs = outer.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret"), docs.join("link")).unwrap();
        let root = DocumentRoot::new(&docs).unwrap();

        assert!(matches!(
            root.resolve("link").await,
            Err(ServeError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_document_root_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            DocumentRoot::new(&file),
            Err(ConfigError::NotADirectory(_))
        ));
        assert!(matches!(
            DocumentRoot::new(dir.path().join("missing")),
            Err(ConfigError::DocumentRoot { .. })
        ));
    }
}
