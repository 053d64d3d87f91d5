//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! [`operations`](super::operations), which decides where a thumbnail goes and
//! how big it may be, and the [`backend`](super::backend), which does the
//! pixel work. Tests swap in a mock backend without touching operation logic.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Parameters for a single thumbnail operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Bounding box width (keep-aspect) or exact width (forced).
    pub width: u32,
    /// Bounding box height (keep-aspect) or exact height (forced).
    pub height: u32,
    pub quality: Quality,
    /// Fit inside the box preserving proportions instead of stretching to it.
    pub keep_aspect: bool,
}
