//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest size that fits inside `bound` while keeping the
/// source aspect ratio.
///
/// Never upscales: a source that already fits is returned unchanged. Each
/// output dimension is at least 1px.
///
/// # Examples
/// ```
/// # use booth_gallery::imaging::calculate_fit_dimensions;
/// // 4:3 landscape into a 300px square → 300x225
/// assert_eq!(calculate_fit_dimensions((800, 600), (300, 300)), (300, 225));
///
/// // Already small enough → untouched
/// assert_eq!(calculate_fit_dimensions((120, 80), (300, 300)), (120, 80));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bound;

    if src_w == 0 || src_h == 0 || (src_w <= max_w && src_h <= max_h) {
        return source;
    }

    let scale = f64::min(
        max_w as f64 / src_w as f64,
        max_h as f64 / src_h as f64,
    );
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}
