//! High-level thumbnail operations.
//!
//! These functions decide where a thumbnail lives and what size it may be,
//! then hand the pixel work to a backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Quality, ThumbnailParams};
use crate::config::Settings;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailConfig {
    /// Bounding box as `(width, height)`.
    pub size: (u32, u32),
    pub quality: Quality,
    pub keep_aspect: bool,
    pub suffix: String,
    pub output_folder: Option<String>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ThumbnailConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            size: settings.size,
            quality: settings.quality,
            keep_aspect: settings.keep_aspect,
            suffix: settings.suffix.clone(),
            output_folder: settings.output_folder.clone(),
        }
    }
}

/// A thumbnail written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedThumbnail {
    pub path: PathBuf,
    pub dimensions: Dimensions,
}

/// Deterministic thumbnail location for `source`.
///
/// `photo1.jpg` with suffix `_thumb` becomes `photo1_thumb.jpg` next to the
/// source, or inside `output_folder` under the source's directory.
///
/// ```
/// # use booth_gallery::imaging::thumbnail_path;
/// # use std::path::Path;
/// let thumb = thumbnail_path(Path::new("/booth/photo1.jpg"), "_thumb", Some("thumbs"));
/// assert_eq!(thumb, Path::new("/booth/thumbs/photo1_thumb.jpg"));
/// ```
pub fn thumbnail_path(source: &Path, suffix: &str, output_folder: Option<&str>) -> PathBuf {
    let dir = source.parent().unwrap_or(Path::new(""));
    let dir = match output_folder.filter(|f| !f.is_empty()) {
        Some(folder) => dir.join(folder),
        None => dir.to_path_buf(),
    };

    let mut name = OsString::from(source.file_stem().unwrap_or_default());
    name.push(suffix);
    if let Some(ext) = source.extension() {
        name.push(".");
        name.push(ext);
    }
    dir.join(name)
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, output: &Path, config: &ThumbnailConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width: config.size.0,
        height: config.size.1,
        quality: config.quality,
        keep_aspect: config.keep_aspect,
    }
}

/// Create the thumbnail for `source`, creating the output folder if needed.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    config: &ThumbnailConfig,
) -> Result<GeneratedThumbnail> {
    let output = thumbnail_path(source, &config.suffix, config.output_folder.as_deref());
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let params = plan_thumbnail(source, &output, config);
    let dimensions = backend.thumbnail(&params)?;

    Ok(GeneratedThumbnail {
        path: output,
        dimensions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn thumbnail_path_next_to_source() {
        assert_eq!(
            thumbnail_path(Path::new("/booth/photo1.jpg"), "_thumb", None),
            PathBuf::from("/booth/photo1_thumb.jpg")
        );
    }

    #[test]
    fn thumbnail_path_in_output_folder() {
        assert_eq!(
            thumbnail_path(Path::new("/booth/photo1.jpg"), "_thumb", Some("thumbs")),
            PathBuf::from("/booth/thumbs/photo1_thumb.jpg")
        );
    }

    #[test]
    fn thumbnail_path_empty_folder_means_none() {
        assert_eq!(
            thumbnail_path(Path::new("/booth/photo1.jpg"), "_thumb", Some("")),
            PathBuf::from("/booth/photo1_thumb.jpg")
        );
    }

    #[test]
    fn thumbnail_path_keeps_extension_case_and_inner_dots() {
        assert_eq!(
            thumbnail_path(Path::new("/booth/2024.01.01-wedding.JPG"), "-s", None),
            PathBuf::from("/booth/2024.01.01-wedding-s.JPG")
        );
    }

    #[test]
    fn thumbnail_path_without_extension() {
        assert_eq!(
            thumbnail_path(Path::new("photo1"), "_thumb", None),
            PathBuf::from("photo1_thumb")
        );
    }

    #[test]
    fn plan_thumbnail_uses_config() {
        let config = ThumbnailConfig {
            size: (640, 480),
            quality: Quality::new(60),
            keep_aspect: false,
            ..ThumbnailConfig::default()
        };
        let params = plan_thumbnail(Path::new("/a.jpg"), Path::new("/a_thumb.jpg"), &config);

        assert_eq!(params.width, 640);
        assert_eq!(params.height, 480);
        assert_eq!(params.quality.value(), 60);
        assert!(!params.keep_aspect);
    }

    #[test]
    fn default_config_matches_settings_defaults() {
        let config = ThumbnailConfig::default();
        assert_eq!(config.size, (300, 300));
        assert_eq!(config.quality.value(), 85);
        assert!(config.keep_aspect);
        assert_eq!(config.suffix, "_thumb");
        assert_eq!(config.output_folder, None);
    }

    #[test]
    fn create_thumbnail_uses_backend() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo1.jpg");
        let backend = MockBackend::new();

        let thumb = create_thumbnail(&backend, &source, &ThumbnailConfig::default()).unwrap();

        assert_eq!(thumb.path, tmp.path().join("photo1_thumb.jpg"));
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Thumbnail {
                width: 300,
                height: 300,
                quality: 85,
                keep_aspect: true,
                ..
            }
        ));
    }

    #[test]
    fn create_thumbnail_creates_output_folder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo1.jpg");
        let config = ThumbnailConfig {
            output_folder: Some("thumbs/small".to_string()),
            ..ThumbnailConfig::default()
        };

        let thumb = create_thumbnail(&MockBackend::new(), &source, &config).unwrap();

        assert!(tmp.path().join("thumbs/small").is_dir());
        assert_eq!(thumb.path, tmp.path().join("thumbs/small/photo1_thumb.jpg"));
    }

    #[test]
    fn create_thumbnail_propagates_backend_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = create_thumbnail(
            &MockBackend::failing("decode error"),
            &tmp.path().join("photo1.jpg"),
            &ThumbnailConfig::default(),
        );
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }
}
