//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//! | Encode → other | `DynamicImage::write_to`, format from the output extension |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::ThumbnailParams;
use crate::atomic::sibling_temp_file;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Save a DynamicImage to the given path, inferring format from extension.
///
/// JPEG honors `quality` and drops any alpha channel. The image is encoded
/// into a temp file next to `path` and renamed over it, so a failed encode
/// leaves no partial file behind.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path)
        .ok()
        .filter(|f| f.writing_enabled())
        .ok_or_else(|| {
            BackendError::ProcessingFailed(format!(
                "Unsupported output format: {}",
                path.display()
            ))
        })?;

    let mut file = sibling_temp_file(path)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        let encoded = match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut writer, quality as u8);
                DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
            }
            other => img.write_to(&mut writer, other),
        };
        encoded.map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
        })?;
        writer.flush()?;
    }
    file.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError> {
        let img = load_image(&params.source)?;
        let source = (img.width(), img.height());

        let target = if params.keep_aspect {
            calculate_fit_dimensions(source, (params.width, params.height))
        } else {
            (params.width, params.height)
        };

        let resized = if target == source {
            img
        } else {
            img.resize_exact(target.0, target.1, FilterType::Lanczos3)
        };

        save_image(&resized, &params.output, params.quality.value())?;
        Ok(Dimensions {
            width: resized.width(),
            height: resized.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::test_helpers::{create_test_jpeg, create_test_png};

    fn params(source: &Path, output: &Path, box_: (u32, u32), keep_aspect: bool) -> ThumbnailParams {
        ThumbnailParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            width: box_.0,
            height: box_.1,
            quality: Quality::new(85),
            keep_aspect,
        }
    }

    #[test]
    fn keep_aspect_fits_within_box() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo1.jpg");
        create_test_jpeg(&source, 800, 600);

        let output = tmp.path().join("photo1_thumb.jpg");
        let dims = RustBackend::new()
            .thumbnail(&params(&source, &output, (300, 300), true))
            .unwrap();

        assert_eq!(dims, Dimensions { width: 300, height: 225 });
        assert_eq!(image::image_dimensions(&output).unwrap(), (300, 225));
    }

    #[test]
    fn keep_aspect_never_upscales() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("small.jpg");
        create_test_jpeg(&source, 120, 80);

        let output = tmp.path().join("small_thumb.jpg");
        RustBackend::new()
            .thumbnail(&params(&source, &output, (300, 300), true))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (120, 80));
    }

    #[test]
    fn forced_size_distorts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo1.jpg");
        create_test_jpeg(&source, 800, 600);

        let output = tmp.path().join("photo1_thumb.jpg");
        RustBackend::new()
            .thumbnail(&params(&source, &output, (200, 300), false))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (200, 300));
    }

    #[test]
    fn forced_size_upscales_small_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("small.jpg");
        create_test_jpeg(&source, 50, 40);

        let output = tmp.path().join("small_thumb.jpg");
        RustBackend::new()
            .thumbnail(&params(&source, &output, (100, 100), false))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (100, 100));
    }

    #[test]
    fn png_source_keeps_png_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo1.png");
        create_test_png(&source, 400, 400);

        let output = tmp.path().join("photo1_thumb.png");
        RustBackend::new()
            .thumbnail(&params(&source, &output, (100, 100), true))
            .unwrap();

        assert_eq!(ImageFormat::from_path(&output).unwrap(), ImageFormat::Png);
        assert_eq!(image::image_dimensions(&output).unwrap(), (100, 100));
    }

    #[test]
    fn lower_quality_gives_smaller_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo1.jpg");
        create_test_jpeg(&source, 600, 600);

        let high = tmp.path().join("high.jpg");
        let low = tmp.path().join("low.jpg");
        let backend = RustBackend::new();
        let mut p = params(&source, &high, (300, 300), true);
        p.quality = Quality::new(100);
        backend.thumbnail(&p).unwrap();
        p.output = low.clone();
        p.quality = Quality::new(10);
        backend.thumbnail(&p).unwrap();

        let high_len = std::fs::metadata(&high).unwrap().len();
        let low_len = std::fs::metadata(&low).unwrap().len();
        assert!(low_len < high_len, "q10={low_len} q100={high_len}");
    }

    #[test]
    fn missing_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = RustBackend::new().thumbnail(&params(
            &tmp.path().join("missing.jpg"),
            &tmp.path().join("missing_thumb.jpg"),
            (300, 300),
            true,
        ));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn undecodable_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not an image").unwrap();

        let result = RustBackend::new().thumbnail(&params(
            &source,
            &tmp.path().join("broken_thumb.jpg"),
            (300, 300),
            true,
        ));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn unsupported_output_format_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo1.jpg");
        create_test_jpeg(&source, 100, 100);

        let output = tmp.path().join("photo1_thumb.xyz");
        let result = RustBackend::new().thumbnail(&params(&source, &output, (50, 50), true));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!output.exists());
    }

    #[test]
    fn unwritable_destination_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo1.jpg");
        create_test_jpeg(&source, 100, 100);

        let output = tmp.path().join("no-such-dir").join("photo1_thumb.jpg");
        let result = RustBackend::new().thumbnail(&params(&source, &output, (50, 50), true));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn failed_encode_leaves_no_partial_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        // JPEG cannot hold a width above 65535.
        let source = tmp.path().join("strip.png");
        create_test_png(&source, 70_000, 1);

        let output = tmp.path().join("strip_thumb.jpg");
        let result =
            RustBackend::new().thumbnail(&params(&source, &output, (70_000, 1), true));

        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!output.exists());
        let files: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn failed_encode_keeps_previous_thumbnail() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("strip.png");
        create_test_png(&source, 70_000, 1);
        let output = tmp.path().join("strip_thumb.jpg");
        std::fs::write(&output, b"previous thumbnail").unwrap();

        let result =
            RustBackend::new().thumbnail(&params(&source, &output, (70_000, 1), true));

        assert!(result.is_err());
        assert_eq!(std::fs::read(&output).unwrap(), b"previous thumbnail");
    }

    #[cfg(unix)]
    #[test]
    fn thumbnail_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo1.jpg");
        create_test_jpeg(&source, 100, 100);

        let output = tmp.path().join("photo1_thumb.jpg");
        RustBackend::new()
            .thumbnail(&params(&source, &output, (50, 50), true))
            .unwrap();

        let mode = std::fs::metadata(&output).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
