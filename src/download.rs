//! Turning a finished conversion into a file on disk.
//!
//! [`CsvDownload`] is the desktop counterpart of a browser blob download: a
//! byte buffer, a media type and a suggested file name.  Saving consumes the
//! download, so the buffer is released as soon as the write returns.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Media type attached to every converted file.
pub const CSV_MEDIA_TYPE: &str = "text/csv;charset=utf-8";

const JSON_SUFFIX: &str = ".json";
const CSV_SUFFIX: &str = ".csv";

/// How many `name (n).csv` variants `save_in` tries before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1_000;

// ---------------------------------------------------------------------------
// DownloadError
// ---------------------------------------------------------------------------

/// Failures while writing a download to disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The destination directory could not be created.
    #[error("cannot create {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// The file itself could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

// ---------------------------------------------------------------------------
// CsvDownload
// ---------------------------------------------------------------------------

/// A converted result ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    /// Suggested file name, see [`output_file_name`].
    pub file_name: String,
    /// Always [`CSV_MEDIA_TYPE`].
    pub media_type: &'static str,
    /// Payload bytes (UTF-8 CSV).
    pub bytes: Vec<u8>,
}

impl CsvDownload {
    /// Build a download for `payload` named after the input file.
    pub fn new(input_name: &str, payload: &str) -> Self {
        Self {
            file_name: output_file_name(input_name),
            media_type: CSV_MEDIA_TYPE,
            bytes: payload.as_bytes().to_vec(),
        }
    }

    /// Write into `dir` under the suggested file name, creating `dir` if
    /// needed.  Existing files are never touched: when `data.csv` is taken
    /// the download becomes `data (1).csv`, then `data (2).csv` and so on.
    pub fn save_in(self, dir: &Path) -> Result<PathBuf, DownloadError> {
        std::fs::create_dir_all(dir).map_err(|source| DownloadError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let stem = self
            .file_name
            .strip_suffix(CSV_SUFFIX)
            .unwrap_or(&self.file_name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = if attempt == 0 {
                dir.join(&self.file_name)
            } else {
                dir.join(format!("{stem} ({attempt}){CSV_SUFFIX}"))
            };

            // create_new fails instead of truncating a file that appeared
            // after the name was picked.
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(DownloadError::Write { path, source }),
            };
            file.write_all(&self.bytes)
                .map_err(|source| DownloadError::Write {
                    path: path.clone(),
                    source,
                })?;
            self.log_saved(&path);
            return Ok(path);
        }

        Err(DownloadError::Write {
            path: dir.join(&self.file_name),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "no free file name left"),
        })
    }

    /// Write to exactly `path`, replacing whatever is there.  Used for the
    /// answer of a save dialog, which has already confirmed the overwrite.
    pub fn save_to(self, path: &Path) -> Result<PathBuf, DownloadError> {
        std::fs::write(path, &self.bytes).map_err(|source| DownloadError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        self.log_saved(path);
        Ok(path.to_path_buf())
    }

    fn log_saved(&self, path: &Path) {
        log::info!(
            "saved {} ({} bytes, {})",
            path.display(),
            self.bytes.len(),
            self.media_type
        );
    }
}

/// Name of the CSV produced from `input_name`: one trailing `.json`
/// (any case) is dropped and `.csv` appended.
///
/// ```
/// use json_to_csv::download::output_file_name;
///
/// assert_eq!(output_file_name("data.JSON"), "data.csv");
/// assert_eq!(output_file_name("report"), "report.csv");
/// ```
pub fn output_file_name(input_name: &str) -> String {
    let stem = input_name
        .len()
        .checked_sub(JSON_SUFFIX.len())
        .and_then(|cut| {
            input_name
                .get(cut..)
                .filter(|tail| tail.eq_ignore_ascii_case(JSON_SUFFIX))
                .map(|_| &input_name[..cut])
        })
        .unwrap_or(input_name);
    format!("{stem}.csv")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn strips_json_suffix_case_insensitively() {
        assert_eq!(output_file_name("data.json"), "data.csv");
        assert_eq!(output_file_name("data.JSON"), "data.csv");
        assert_eq!(output_file_name("data.Json"), "data.csv");
    }

    #[test]
    fn names_without_suffix_just_gain_csv() {
        assert_eq!(output_file_name("report"), "report.csv");
        assert_eq!(output_file_name("notes.txt"), "notes.txt.csv");
        assert_eq!(output_file_name("data.jsonl"), "data.jsonl.csv");
    }

    #[test]
    fn only_the_last_suffix_is_stripped() {
        assert_eq!(output_file_name("archive.json.json"), "archive.json.csv");
        assert_eq!(output_file_name(".json"), ".csv");
    }

    #[test]
    fn multibyte_names_do_not_panic() {
        assert_eq!(output_file_name("ข้อมูล.json"), "ข้อมูล.csv");
        assert_eq!(output_file_name("ข้อ"), "ข้อ.csv");
    }

    #[test]
    fn download_carries_csv_media_type() {
        let dl = CsvDownload::new("orders.json", "a,b\n1,2");
        assert_eq!(dl.file_name, "orders.csv");
        assert_eq!(dl.media_type, "text/csv;charset=utf-8");
        assert_eq!(dl.bytes, b"a,b\n1,2");
    }

    #[test]
    fn save_in_creates_directory_and_writes_bytes() {
        let dir = tempdir().expect("temp dir");
        let target = dir.path().join("nested").join("out");

        let path = CsvDownload::new("orders.json", "a,b\n1,2")
            .save_in(&target)
            .expect("save");

        assert_eq!(path, target.join("orders.csv"));
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "a,b\n1,2");
    }

    #[test]
    fn save_in_keeps_existing_file_and_picks_next_name() {
        let dir = tempdir().expect("temp dir");
        let existing = dir.path().join("data.csv");
        std::fs::write(&existing, "USER DATA").expect("write");

        let path = CsvDownload::new("data.json", "id,name\n1,a")
            .save_in(dir.path())
            .expect("save");

        assert_eq!(path, dir.path().join("data (1).csv"));
        assert_eq!(std::fs::read_to_string(&existing).expect("read"), "USER DATA");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "id,name\n1,a");
    }

    #[test]
    fn save_in_counts_past_taken_variants() {
        let dir = tempdir().expect("temp dir");
        std::fs::write(dir.path().join("data.csv"), "a").expect("write");
        std::fs::write(dir.path().join("data (1).csv"), "b").expect("write");

        let path = CsvDownload::new("data.json", "c")
            .save_in(dir.path())
            .expect("save");

        assert_eq!(path, dir.path().join("data (2).csv"));
        assert_eq!(std::fs::read_to_string(dir.path().join("data (1).csv")).expect("read"), "b");
    }

    #[test]
    fn save_to_replaces_existing_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("chosen.csv");
        std::fs::write(&path, "old").expect("write");

        CsvDownload::new("x.json", "new").save_to(&path).expect("save");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "new");
    }

    #[test]
    fn save_to_reports_unwritable_path() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("missing-dir").join("x.csv");

        let err = CsvDownload::new("x.json", "a").save_to(&path).unwrap_err();
        assert!(matches!(err, DownloadError::Write { .. }));
    }
}
