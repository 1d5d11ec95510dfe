//! Pure dimension math for thumbnails. No I/O.

/// Dimensions for an image thumbnail of `target_height`, preserving aspect.
///
/// Sources already at or below the target height keep their size.
///
/// ```
/// # use media_gallery::thumbs::calculations::fit_height;
/// assert_eq!(fit_height((4000, 3000), 200), (267, 200));
/// assert_eq!(fit_height((120, 90), 200), (120, 90));
/// ```
pub fn fit_height(source: (u32, u32), target_height: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_h == 0 || src_h <= target_height {
        return source;
    }
    let w = (src_w as f64 * target_height as f64 / src_h as f64).round() as u32;
    (w.max(1), target_height)
}

/// Width for a video frame scaled to `target_height`, rounded to an even
/// number the way video scalers require.
///
/// ```
/// # use media_gallery::thumbs::calculations::even_width_for_height;
/// assert_eq!(even_width_for_height((1920, 1080), 200), 356);
/// ```
pub fn even_width_for_height(source: (u32, u32), target_height: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_h == 0 {
        return 2;
    }
    let exact = src_w as f64 * target_height as f64 / src_h as f64;
    let even = ((exact / 2.0).round() as u32) * 2;
    even.max(2)
}

/// Top-left offset that centres an `inner` box within an `outer` box.
/// Negative when the inner box is larger.
pub fn centered_offset(outer: (u32, u32), inner: (u32, u32)) -> (i64, i64) {
    (
        (outer.0 as i64 - inner.0 as i64) / 2,
        (outer.1 as i64 - inner.1 as i64) / 2,
    )
}
