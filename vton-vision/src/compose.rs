//! Alpha compositing of the warped garment over the person image.

use image::{Rgb, RgbImage, RgbaImage};

/// Blend `overlay` over `base` using the overlay's per-pixel alpha:
/// `out = a * overlay + (1 - a) * base` with `a = alpha / 255`.
///
/// Fully transparent overlay pixels leave the base byte-identical; fully
/// opaque pixels replace it with the overlay's color channels exactly.
/// Both images must share dimensions; the pipeline guarantees this since
/// the warp renders into the person-sized canvas.
pub fn composite_over(base: &RgbImage, overlay: &RgbaImage) -> RgbImage {
    debug_assert_eq!(base.dimensions(), overlay.dimensions());

    let (width, height) = base.dimensions();
    let mut out = RgbImage::new(width, height);

    for (x, y, px) in out.enumerate_pixels_mut() {
        let b = base.get_pixel(x, y);
        let o = overlay.get_pixel(x, y);
        let alpha = o[3] as f32 / 255.0;
        let inv = 1.0 - alpha;

        *px = Rgb([
            (alpha * o[0] as f32 + inv * b[0] as f32).round() as u8,
            (alpha * o[1] as f32 + inv * b[1] as f32).round() as u8,
            (alpha * o[2] as f32 + inv * b[2] as f32).round() as u8,
        ]);
    }

    out
}
