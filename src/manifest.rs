//! The `thumbs.json` manifest.
//!
//! One manifest lives in each picture directory. It is a JSON array, newest
//! picture first:
//!
//! ```json
//! [
//!   {
//!     "thumb": "http://booth.local/photo2_thumb.jpg",
//!     "full": "http://booth.local/photo2.jpg",
//!     "filename": "photo2.jpg",
//!     "qrcode": "http://booth.local/photo2_qrcode.png"
//!   },
//!   {
//!     "thumb": "photo1_thumb.jpg",
//!     "full": "photo1.jpg",
//!     "filename": "photo1.jpg"
//!   }
//! ]
//! ```
//!
//! # Update Cycle
//!
//! Every capture reads the whole file, drops any entry for the same picture,
//! prepends the new entry and rewrites the whole file:
//!
//! - **Load is self-healing.** A missing, unreadable or non-array manifest
//!   starts over from an empty list instead of failing the capture.
//! - **Dedup is double-keyed.** An old entry is dropped if its `filename`
//!   or its `full` matches the new entry, so entries survive a switch
//!   between bare names and base-URL-prefixed links without duplicating.
//! - **Foreign entries are kept verbatim.** Elements this plugin did not
//!   write (extra fields, other shapes) pass through untouched.
//! - **Writes are atomic.** The new content goes to a temp file in the same
//!   directory, which is then renamed over the manifest. Readers see the old
//!   file or the new one, never a mix.
//!
//! There is no locking. Two processes updating the same manifest at once
//! race at the read-modify-write level and the last rename wins.

use crate::atomic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One picture in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Thumbnail link: path relative to the manifest, or a full URL.
    pub thumb: String,
    /// Full-size picture link.
    pub full: String,
    /// Base name of the full picture. Unique within a manifest.
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,
}

impl ManifestEntry {
    /// Build the entry for a capture.
    ///
    /// Paths are made relative to the picture's directory (where the manifest
    /// lives), falling back to the bare file name for paths outside it. With
    /// a base URL, each link becomes `base_url/relative`.
    pub fn for_capture(
        picture: &Path,
        thumbnail: &Path,
        qrcode: Option<&Path>,
        base_url: Option<&str>,
    ) -> Self {
        let dir = picture.parent().unwrap_or(Path::new(""));
        let filename = file_name(picture);
        Self {
            thumb: url_join(base_url, &relative_link(thumbnail, dir)),
            full: url_join(base_url, &filename),
            qrcode: qrcode.map(|qr| url_join(base_url, &relative_link(qr, dir))),
            filename,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `path` relative to `dir` with `/` separators, or its file name if it is
/// not below `dir`.
fn relative_link(path: &Path, dir: &Path) -> String {
    let Ok(relative) = path.strip_prefix(dir) else {
        return file_name(path);
    };
    let parts: Option<Vec<String>> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    match parts {
        Some(parts) if !parts.is_empty() => parts.join("/"),
        _ => file_name(path),
    }
}

/// Join a link onto an optional base URL with exactly one `/` between them.
///
/// ```
/// # use booth_gallery::manifest::url_join;
/// assert_eq!(url_join(Some("http://x/"), "a.jpg"), "http://x/a.jpg");
/// assert_eq!(url_join(Some("http://x"), "a.jpg"), "http://x/a.jpg");
/// assert_eq!(url_join(None, "a.jpg"), "a.jpg");
/// ```
pub fn url_join(base: Option<&str>, name: &str) -> String {
    match base.filter(|b| !b.is_empty()) {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), name),
        None => name.to_string(),
    }
}

/// In-memory manifest: raw JSON elements, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    entries: Vec<Value>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from disk. Returns an empty manifest if the file doesn't exist,
    /// can't be read, or isn't a JSON array.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::new(),
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(entries)) => Self { entries },
            _ => Self::new(),
        }
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Typed view of the entry for `filename`, if present and well-formed.
    pub fn find(&self, filename: &str) -> Option<ManifestEntry> {
        self.entries
            .iter()
            .filter(|e| field(e, "filename") == Some(filename))
            .find_map(|e| serde_json::from_value(e.clone()).ok())
    }

    /// Replace any entry for the same picture and put `entry` first.
    ///
    /// Returns how many old entries were dropped.
    pub fn upsert(&mut self, entry: &ManifestEntry) -> Result<usize, ManifestError> {
        let before = self.entries.len();
        self.entries.retain(|e| {
            field(e, "filename") != Some(entry.filename.as_str())
                && field(e, "full") != Some(entry.full.as_str())
        });
        let removed = before - self.entries.len();
        self.entries.insert(0, serde_json::to_value(entry)?);
        Ok(removed)
    }

    /// Write the new content to a temp file next to `path` without touching
    /// `path` itself. Call [`StagedManifest::commit`] to replace it.
    pub fn stage(&self, path: &Path) -> Result<StagedManifest, ManifestError> {
        std::fs::create_dir_all(atomic::parent_dir(path))?;

        let json = serde_json::to_string_pretty(&self.entries)?;
        let mut file = atomic::sibling_temp_file(path)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;

        Ok(StagedManifest {
            file,
            destination: path.to_path_buf(),
        })
    }

    /// Atomically replace the manifest at `path`.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        self.stage(path)?.commit()
    }
}

fn field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str)
}

/// A fully written manifest waiting to be renamed into place.
///
/// Dropping it without committing removes the temp file.
#[derive(Debug)]
pub struct StagedManifest {
    file: NamedTempFile,
    destination: PathBuf,
}

impl StagedManifest {
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Rename the temp file over the destination.
    pub fn commit(self) -> Result<(), ManifestError> {
        self.file
            .persist(&self.destination)
            .map_err(|e| ManifestError::Io(e.error))?;
        Ok(())
    }
}

/// Load the manifest at `path`, upsert `entry`, and save atomically.
///
/// Returns the number of entries written.
pub fn sync(path: &Path, entry: &ManifestEntry) -> Result<usize, ManifestError> {
    let mut manifest = Manifest::load(path);
    manifest.upsert(entry)?;
    manifest.save(path)?;
    Ok(manifest.len())
}
