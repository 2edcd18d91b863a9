//! Lighting harmonization post-filter.
//!
//! A deterministic cosmetic pass that softens the seam between the
//! composited garment and the person: a small blur, a fixed brightness
//! lift in HSV space, and a weighted blend back with the unfiltered
//! image. This is an intentionally cheap approximation of lighting
//! harmonization, not a learned model.

use image::{Rgb, RgbImage};

/// Separable 5-tap binomial kernel, sums to 16.
const KERNEL: [f32; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];
const KERNEL_SUM: f32 = 16.0;

/// Brightness offset added to the HSV value channel (u8 scale).
const VALUE_OFFSET: f32 = 10.0;

/// Blend weight of the filtered image against the original.
const FILTERED_WEIGHT: f32 = 0.7;

/// Apply the three-step harmonization pass:
/// blur (5-tap, clamp-to-edge borders) → HSV value +10 (clamped) →
/// `0.7 * filtered + 0.3 * original`.
pub fn harmonize(image: &RgbImage) -> RgbImage {
    let blurred = blur5(image);
    let brightened = lift_value(&blurred);
    blend(&brightened, image, FILTERED_WEIGHT)
}

/// Separable 5-tap blur. Borders clamp to the edge pixel, so the image
/// mean shifts less near borders than zero padding would.
fn blur5(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let clamp_x = |x: i64| x.clamp(0, width as i64 - 1) as u32;
    let clamp_y = |y: i64| y.clamp(0, height as i64 - 1) as u32;

    // Horizontal pass into a float buffer, then vertical pass.
    let mut horiz = vec![[0.0f32; 3]; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 3];
            for (k, weight) in KERNEL.iter().enumerate() {
                let sx = clamp_x(x as i64 + k as i64 - 2);
                let px = image.get_pixel(sx, y);
                for c in 0..3 {
                    acc[c] += weight * px[c] as f32;
                }
            }
            horiz[(y * width + x) as usize] = [
                acc[0] / KERNEL_SUM,
                acc[1] / KERNEL_SUM,
                acc[2] / KERNEL_SUM,
            ];
        }
    }

    let mut out = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 3];
            for (k, weight) in KERNEL.iter().enumerate() {
                let sy = clamp_y(y as i64 + k as i64 - 2);
                let src = horiz[(sy * width + x) as usize];
                for c in 0..3 {
                    acc[c] += weight * src[c];
                }
            }
            out.put_pixel(
                x,
                y,
                Rgb([
                    (acc[0] / KERNEL_SUM).round() as u8,
                    (acc[1] / KERNEL_SUM).round() as u8,
                    (acc[2] / KERNEL_SUM).round() as u8,
                ]),
            );
        }
    }
    out
}

/// Add a fixed offset to the HSV value channel, clamped at 255.
fn lift_value(image: &RgbImage) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        let (h, s, v) = rgb_to_hsv(src.0);
        let v = (v + VALUE_OFFSET).min(255.0);
        *dst = Rgb(hsv_to_rgb(h, s, v));
    }
    out
}

fn blend(filtered: &RgbImage, original: &RgbImage, weight: f32) -> RgbImage {
    let inv = 1.0 - weight;
    let mut out = RgbImage::new(original.width(), original.height());
    for ((f, o), dst) in filtered.pixels().zip(original.pixels()).zip(out.pixels_mut()) {
        *dst = Rgb([
            (weight * f[0] as f32 + inv * o[0] as f32).round() as u8,
            (weight * f[1] as f32 + inv * o[1] as f32).round() as u8,
            (weight * f[2] as f32 + inv * o[2] as f32).round() as u8,
        ]);
    }
    out
}

/// RGB (u8) to HSV with hue in degrees, saturation in [0,1] and value on
/// the u8 scale.
fn rgb_to_hsv(rgb: [u8; 3]) -> (f32, f32, f32) {
    let r = rgb[0] as f32;
    let g = rgb[1] as f32;
    let b = rgb[2] as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h, s, max)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let c = v * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match hp {
        hp if hp < 1.0 => (c, x, 0.0),
        hp if hp < 2.0 => (x, c, 0.0),
        hp if hp < 3.0 => (0.0, c, x),
        hp if hp < 4.0 => (0.0, x, c),
        hp if hp < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [
        (r + m).round().clamp(0.0, 255.0) as u8,
        (g + m).round().clamp(0.0, 255.0) as u8,
        (b + m).round().clamp(0.0, 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(w: u32, h: u32) -> RgbImage {
        let mut img = RgbImage::new(w, h);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgb([
                ((x * 13 + y * 7) % 256) as u8,
                ((x * 3 + y * 17) % 256) as u8,
                ((x * 29 + y) % 256) as u8,
            ]);
        }
        img
    }

    #[test]
    fn test_harmonize_deterministic() {
        let img = textured(40, 30);
        assert_eq!(harmonize(&img), harmonize(&img));
    }

    #[test]
    fn test_harmonize_preserves_dimensions() {
        let img = textured(21, 13);
        assert_eq!(harmonize(&img).dimensions(), (21, 13));
    }

    #[test]
    fn test_harmonize_lifts_brightness_of_flat_image() {
        // A flat mid-gray image: the blur is a no-op, so the pass reduces
        // to the value lift blended at 0.7.
        let img = RgbImage::from_pixel(16, 16, Rgb([100, 100, 100]));
        let out = harmonize(&img);
        // 0.7 * 110 + 0.3 * 100 = 107
        assert_eq!(out.get_pixel(8, 8).0, [107, 107, 107]);
    }

    #[test]
    fn test_value_lift_clamps_at_white() {
        let img = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        let out = harmonize(&img);
        assert_eq!(out.get_pixel(4, 4).0, [255, 255, 255]);
    }

    #[test]
    fn test_hsv_round_trip_on_primaries() {
        for rgb in [[255, 0, 0], [0, 255, 0], [0, 0, 255], [128, 64, 32]] {
            let (h, s, v) = rgb_to_hsv(rgb);
            assert_eq!(hsv_to_rgb(h, s, v), rgb);
        }
    }
}
