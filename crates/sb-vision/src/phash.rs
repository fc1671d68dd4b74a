//! DCT perceptual hash, bit-compatible with the catalog builder: luma
//! conversion, 32x32 Lanczos downscale, 2-D DCT-II, top-left 8x8
//! coefficients compared against their median.

use image::{GrayImage, RgbaImage};
use sb_data::PerceptualHash;

const HASH_SIZE: usize = 8;
const SAMPLE_SIZE: u32 = 32;

/// Hash an icon crop. Returns `None` for an empty crop.
pub fn perceptual_hash(img: &RgbaImage) -> Option<PerceptualHash> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }

    let gray = luma(img);
    let small = image::imageops::resize(
        &gray,
        SAMPLE_SIZE,
        SAMPLE_SIZE,
        image::imageops::FilterType::Lanczos3,
    );
    let pixels: Vec<f64> = small.pixels().map(|p| p[0] as f64).collect();

    let coefficients = low_frequency_dct(&pixels, SAMPLE_SIZE as usize);
    let median = median(&coefficients);

    let bits = coefficients
        .iter()
        .fold(0u64, |acc, &c| (acc << 1) | u64::from(c > median));
    Some(PerceptualHash(bits))
}

/// ITU-R 601 luma with the same fixed-point rounding the catalog builder uses.
pub(crate) fn luma(img: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let (r, g, b) = (p[0] as u32, p[1] as u32, p[2] as u32);
        image::Luma([((r * 19595 + g * 38470 + b * 7471 + 0x8000) >> 16) as u8])
    })
}

/// Unnormalized DCT-II over both axes of an `n x n` row-major block,
/// keeping only the `HASH_SIZE x HASH_SIZE` lowest frequencies (row-major).
fn low_frequency_dct(pixels: &[f64], n: usize) -> Vec<f64> {
    let basis: Vec<Vec<f64>> = (0..HASH_SIZE)
        .map(|k| {
            (0..n)
                .map(|i| {
                    (std::f64::consts::PI * k as f64 * (2 * i + 1) as f64 / (2 * n) as f64).cos()
                })
                .collect()
        })
        .collect();

    // Vertical pass: column transform, rows u < HASH_SIZE
    let mut vertical = vec![0.0; HASH_SIZE * n];
    for u in 0..HASH_SIZE {
        for x in 0..n {
            vertical[u * n + x] = (0..n).map(|y| pixels[y * n + x] * basis[u][y]).sum();
        }
    }

    let mut out = Vec::with_capacity(HASH_SIZE * HASH_SIZE);
    for u in 0..HASH_SIZE {
        for v in 0..HASH_SIZE {
            out.push((0..n).map(|x| vertical[u * n + x] * basis[v][x]).sum());
        }
    }
    out
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Blocky pseudo-random texture, values 20..=180.
    fn texture(width: u32, height: u32, seed: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let cell = (x / 12).wrapping_mul(73_856_093)
                ^ (y / 12).wrapping_mul(19_349_663)
                ^ seed.wrapping_mul(83_492_791);
            let v = 20 + (cell.wrapping_mul(2_654_435_761) >> 24) % 161;
            image::Rgba([v as u8, v as u8, v as u8, 255])
        })
    }

    #[test]
    fn test_identical_images_hash_equal() {
        let a = texture(228, 101, 1);
        let b = texture(228, 101, 1);
        assert_eq!(perceptual_hash(&a), perceptual_hash(&b));
    }

    #[test]
    fn test_different_textures_are_far_apart() {
        let a = perceptual_hash(&texture(228, 101, 1)).unwrap();
        let b = perceptual_hash(&texture(228, 101, 2)).unwrap();
        assert!(a.distance(&b) > 10, "distance was {}", a.distance(&b));
    }

    #[test]
    fn test_brightness_shift_is_tolerated() {
        let base = texture(228, 101, 3);
        let brighter = RgbaImage::from_fn(228, 101, |x, y| {
            let p = base.get_pixel(x, y);
            image::Rgba([p[0] + 20, p[1] + 20, p[2] + 20, 255])
        });
        let a = perceptual_hash(&base).unwrap();
        let b = perceptual_hash(&brighter).unwrap();
        assert!(a.distance(&b) <= 4, "distance was {}", a.distance(&b));
    }

    #[test]
    fn test_empty_crop_has_no_hash() {
        assert!(perceptual_hash(&RgbaImage::new(0, 10)).is_none());
    }

    #[test]
    fn test_luma_weights() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
        assert_eq!(luma(&img).get_pixel(0, 0)[0], 76);
        let white = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        assert_eq!(luma(&white).get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}
