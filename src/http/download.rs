//! Naming and placing downloaded files.
//!
//! A download first lands in an anonymous temporary file. Once the response
//! is confirmed successful it is renamed to
//! `<download dir>/<remote file stem>.<extension>`, where the extension comes
//! from the response MIME type, or failing that from the remote URL.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::http::response::ResponseMeta;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use url::Url;

/// Maps MIME types to file extensions.
pub trait ExtensionResolver: Send + Sync {
    /// Extension without the leading dot for a lowercase MIME essence such
    /// as `image/png`.
    fn extension_for(&self, mime_type: &str) -> Option<String>;
}

/// Built-in table covering the common web types.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMimeTypes;

const COMMON_MIME_TYPES: &[(&str, &str)] = &[
    ("application/gzip", "gz"),
    ("application/json", "json"),
    ("application/octet-stream", "bin"),
    ("application/pdf", "pdf"),
    ("application/xml", "xml"),
    ("application/zip", "zip"),
    ("audio/mpeg", "mp3"),
    ("audio/wav", "wav"),
    ("image/gif", "gif"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/svg+xml", "svg"),
    ("image/webp", "webp"),
    ("text/css", "css"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/javascript", "js"),
    ("text/plain", "txt"),
    ("text/xml", "xml"),
    ("video/mp4", "mp4"),
    ("video/webm", "webm"),
];

impl ExtensionResolver for CommonMimeTypes {
    fn extension_for(&self, mime_type: &str) -> Option<String> {
        COMMON_MIME_TYPES
            .iter()
            .find(|(mime, _)| *mime == mime_type)
            .map(|(_, ext)| ext.to_string())
    }
}

/// Last path segment of `url`, split into stem and extension.
fn remote_file_name(url: &Url) -> (Option<String>, Option<String>) {
    let Some(segment) = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
    else {
        return (None, None);
    };

    let path = Path::new(segment);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string);
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_string);
    (stem, ext)
}

/// Final file name for a download of `remote_url` answered with `response`.
pub fn final_file_name(
    remote_url: &Url,
    response: &ResponseMeta,
    resolver: &dyn ExtensionResolver,
) -> String {
    let (stem, url_ext) = remote_file_name(remote_url);
    let stem = stem.unwrap_or_else(|| "download".to_string());
    let ext = response
        .mime_type()
        .and_then(|mime| resolver.extension_for(&mime))
        .or(url_ext);

    match ext {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// Move a finished temporary download to its final name under `dir`.
///
/// An existing file with the same name is replaced.
pub fn finalize(
    temp: TempPath,
    dir: &Path,
    remote_url: &Url,
    response: &ResponseMeta,
    resolver: &dyn ExtensionResolver,
) -> Result<PathBuf, NetError> {
    let location = dir.join(final_file_name(remote_url, response, resolver));
    temp.persist(&location)
        .map_err(|e| e.error)
        .file_context()?;
    tracing::debug!(url = %remote_url, location = %location.display(), "download finalized");
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderValue, CONTENT_TYPE};
    use http::{HeaderMap, StatusCode};

    fn meta(url: &Url, content_type: Option<&'static str>) -> ResponseMeta {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        ResponseMeta::new(Some(StatusCode::OK), headers, url.clone())
    }

    #[test]
    fn test_extension_from_mime_ignores_query() {
        let url = Url::parse("https://cdn.example.com/assets/file?x=1").unwrap();
        let name = final_file_name(&url, &meta(&url, Some("image/png")), &CommonMimeTypes);
        assert_eq!(name, "file.png");
    }

    #[test]
    fn test_mime_wins_over_url_extension() {
        let url = Url::parse("https://cdn.example.com/report.bin").unwrap();
        let name = final_file_name(
            &url,
            &meta(&url, Some("application/pdf; charset=binary")),
            &CommonMimeTypes,
        );
        assert_eq!(name, "report.pdf");
    }

    #[test]
    fn test_url_extension_fallback() {
        let url = Url::parse("https://cdn.example.com/archive.tar.xz").unwrap();
        let name = final_file_name(&url, &meta(&url, Some("application/x-unknown")), &CommonMimeTypes);
        assert_eq!(name, "archive.tar.xz");
    }

    #[test]
    fn test_no_extension_at_all() {
        let url = Url::parse("https://cdn.example.com/blob").unwrap();
        assert_eq!(final_file_name(&url, &meta(&url, None), &CommonMimeTypes), "blob");
    }

    #[test]
    fn test_root_url_gets_placeholder_stem() {
        let url = Url::parse("https://cdn.example.com/").unwrap();
        let name = final_file_name(&url, &meta(&url, Some("text/plain")), &CommonMimeTypes);
        assert_eq!(name, "download.txt");
    }

    #[test]
    fn test_finalize_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        std::fs::write(temp.path(), b"png bytes").unwrap();
        let temp = temp.into_temp_path();

        let url = Url::parse("https://cdn.example.com/file?x=1").unwrap();
        let location = finalize(temp, dir.path(), &url, &meta(&url, Some("image/png")), &CommonMimeTypes)
            .unwrap();
        assert_eq!(location, dir.path().join("file.png"));
        assert_eq!(std::fs::read(&location).unwrap(), b"png bytes");
    }
}
