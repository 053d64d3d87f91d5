//! Thumbnail generation on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Fit within box** | [`calculate_fit_dimensions`] + `resize_exact` (Lanczos3) |
//! | **Force to box** | `resize_exact` (Lanczos3) |
//! | **Encode** | `JpegEncoder` with quality, other formats by extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a thumbnail operation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Path naming and the high-level [`create_thumbnail`]

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::calculate_fit_dimensions;
pub use operations::{GeneratedThumbnail, ThumbnailConfig, create_thumbnail, thumbnail_path};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
