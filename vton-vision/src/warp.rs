//! Perspective resampling of the garment into the person's frame.

use image::{Rgba, RgbaImage};

use crate::transform::PerspectiveTransform;

/// Warp an RGBA garment through the fitted transform into an output canvas
/// of the person image's dimensions.
///
/// Each output pixel is inverse-mapped into garment space and sampled with
/// bilinear interpolation across all four channels. Samples that fall
/// outside the garment stay fully transparent so the garment never bleeds
/// beyond its fitted quadrilateral.
pub fn warp_rgba(
    garment: &RgbaImage,
    transform: &PerspectiveTransform,
    out_width: u32,
    out_height: u32,
) -> RgbaImage {
    let (src_w, src_h) = garment.dimensions();
    let mut output = RgbaImage::new(out_width, out_height);

    for out_y in 0..out_height {
        for out_x in 0..out_width {
            let (in_x, in_y) = transform.apply_inverse(out_x as f64, out_y as f64);
            let in_x = in_x as f32;
            let in_y = in_y as f32;

            if in_x < 0.0 || in_x > (src_w - 1) as f32 || in_y < 0.0 || in_y > (src_h - 1) as f32 {
                continue; // stays Rgba([0, 0, 0, 0])
            }

            // Bilinear interpolation
            let x0 = in_x.floor() as u32;
            let y0 = in_y.floor() as u32;
            let x1 = (x0 + 1).min(src_w - 1);
            let y1 = (y0 + 1).min(src_h - 1);

            let fx = in_x - x0 as f32;
            let fy = in_y - y0 as f32;

            let p00 = garment.get_pixel(x0, y0);
            let p10 = garment.get_pixel(x1, y0);
            let p01 = garment.get_pixel(x0, y1);
            let p11 = garment.get_pixel(x1, y1);

            let w00 = (1.0 - fx) * (1.0 - fy);
            let w10 = fx * (1.0 - fy);
            let w01 = (1.0 - fx) * fy;
            let w11 = fx * fy;

            let mut px = [0u8; 4];
            for c in 0..4 {
                px[c] = (p00[c] as f32 * w00
                    + p10[c] as f32 * w10
                    + p01[c] as f32 * w01
                    + p11[c] as f32 * w11)
                    .round() as u8;
            }
            output.put_pixel(out_x, out_y, Rgba(px));
        }
    }

    output
}
