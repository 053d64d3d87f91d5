//! Static gallery page publishing.
//!
//! The gallery page is a static HTML file that fetches `thumbs.json` in the
//! browser. Nothing is rendered here: the configured template is copied byte
//! for byte next to the picture, replacing any previous copy.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Template not found: {0}")]
    TemplateMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the gallery page for `picture` goes.
pub fn output_path(picture: &Path, output_name: &str) -> PathBuf {
    picture.parent().unwrap_or(Path::new("")).join(output_name)
}

/// Copy `template` to `output` verbatim. Returns the number of bytes copied.
pub fn publish(template: &Path, output: &Path) -> Result<u64, GalleryError> {
    if !template.is_file() {
        return Err(GalleryError::TemplateMissing(template.to_path_buf()));
    }
    if is_same_file(template, output) {
        return Ok(std::fs::metadata(template)?.len());
    }
    Ok(std::fs::copy(template, output)?)
}

/// Copying a file onto itself would truncate it.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
