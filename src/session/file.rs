//! The user's chosen input file.
//!
//! A desktop file picker hands back a path, not a typed handle, so the MIME
//! type is derived from the extension the same way a browser file input does
//! it: `.json` is reported as `application/json`, everything else gets some
//! other type and fails validation.

use std::io;
use std::path::{Path, PathBuf};

/// MIME type every accepted input must report.
pub const JSON_MIME: &str = "application/json";

/// Reference to a user-selected input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name shown in the window and used to name the CSV.
    pub name: String,
    /// Size on disk.
    pub size_bytes: u64,
    /// Reported MIME type, compared verbatim against [`JSON_MIME`].
    pub mime_type: String,
    /// Where the file lives, when it came from disk.
    pub path: Option<PathBuf>,
}

impl SelectedFile {
    /// Describe a file that has no backing path (tests, dropped bytes).
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
            path: None,
        }
    }

    /// Stat `path` and build a candidate from its metadata.
    ///
    /// The file content is never read.
    ///
    /// # Errors
    ///
    /// Any metadata error, or `InvalidInput` when `path` is a directory.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        if meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size_bytes: meta.len(),
            mime_type: mime_for_path(path).to_string(),
            path: Some(path.to_path_buf()),
        })
    }
}

/// MIME type for `path`, judged by extension alone.
pub fn mime_for_path(path: &Path) -> mime::Mime {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("json") => mime::APPLICATION_JSON,
        Some("csv") => mime::TEXT_CSV,
        Some("txt") | Some("md") => mime::TEXT_PLAIN,
        Some("xml") => mime::TEXT_XML,
        Some("html") | Some("htm") => mime::TEXT_HTML,
        Some("pdf") => mime::APPLICATION_PDF,
        Some("png") => mime::IMAGE_PNG,
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn json_extension_maps_to_json_mime() {
        assert_eq!(mime_for_path(Path::new("a/b/data.json")).as_ref(), JSON_MIME);
        assert_eq!(mime_for_path(Path::new("DATA.JSON")).as_ref(), JSON_MIME);
    }

    #[test]
    fn other_extensions_do_not() {
        assert_eq!(mime_for_path(Path::new("table.csv")), mime::TEXT_CSV);
        assert_eq!(
            mime_for_path(Path::new("report")),
            mime::APPLICATION_OCTET_STREAM
        );
        assert_eq!(
            mime_for_path(Path::new("data.json5")),
            mime::APPLICATION_OCTET_STREAM
        );
    }

    #[test]
    fn from_path_reads_size_and_name() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("records.json");
        std::fs::write(&path, br#"[{"id":1}]"#).expect("write");

        let file = SelectedFile::from_path(&path).expect("stat");

        assert_eq!(file.name, "records.json");
        assert_eq!(file.size_bytes, 10);
        assert_eq!(file.mime_type, JSON_MIME);
        assert_eq!(file.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn from_path_rejects_directories() {
        let dir = tempdir().expect("temp dir");
        let err = SelectedFile::from_path(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn from_path_missing_file_is_not_found() {
        let dir = tempdir().expect("temp dir");
        let err = SelectedFile::from_path(&dir.path().join("gone.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
