//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the resize capability the rest of the
//! plugin relies on: decode an image, write a resized copy.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording mock in this module.

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Write a resized copy of `params.source` to `params.output`.
    ///
    /// Returns the dimensions of the written image.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError>;
}
