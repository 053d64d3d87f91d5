//! Shared test utilities for the booth-gallery test suite.
//!
//! Writes small synthetic pictures and reads manifests back as JSON so
//! tests can assert on exact output.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let picture = booth_picture(tmp.path(), "photo1.jpg", 640, 480);
//! // ... run a capture ...
//! let manifest = read_manifest(&tmp.path().join("thumbs.json"));
//! assert_eq!(manifest[0]["filename"], "photo1.jpg");
//! ```

use image::{ImageEncoder, RgbImage};
use serde_json::Value;
use std::path::{Path, PathBuf};

// =========================================================================
// Synthetic pictures
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create a small valid PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write a JPEG called `name` into `dir` and return its path.
pub fn booth_picture(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    create_test_jpeg(&path, width, height);
    path
}

// =========================================================================
// Manifest access
// =========================================================================

/// Parse the manifest at `path`, panicking if it is missing or invalid.
pub fn read_manifest(path: &Path) -> Value {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("manifest {} not readable: {e}", path.display()));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("manifest {} is not JSON: {e}", path.display()))
}

/// The `filename` of every manifest entry, in file order.
pub fn manifest_filenames(manifest: &Value) -> Vec<&str> {
    manifest
        .as_array()
        .expect("manifest is not an array")
        .iter()
        .filter_map(|e| e.get("filename").and_then(Value::as_str))
        .collect()
}
