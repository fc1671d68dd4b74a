use anyhow::{Context, Result};
use image::RgbaImage;
use sb_data::InputError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub mod regions;

pub use regions::{MatchField, MatchTemplate, PlayerField, PlayerTemplate, RegionMap};

/// Pixel rectangle `(x1, y1)..(x2, y2)`, end-exclusive, in screenshot coordinates.
/// Coordinates may fall outside the image; cropping clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        (self.x2 - self.x1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y2 - self.y1).max(0) as u32
    }

    /// Move the rectangle by `(dx, dy)`.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }
}

/// Global nudge applied to a whole group of regions when the scoreboard is
/// rendered slightly off the calibrated template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub x: i32,
    pub y: i32,
}

impl Shift {
    pub const ZERO: Shift = Shift { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Load a scoreboard screenshot. A missing or undecodable file is fatal.
pub fn load_screenshot(path: &Path) -> Result<RgbaImage> {
    let reader = image::ImageReader::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = reader
        .with_guessed_format()
        .map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|e| InputError::format(path, e.to_string()))
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let img = img.to_rgba8();
    debug!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Crop a pixel rectangle from the frame, clamped to the frame bounds.
/// A rectangle entirely outside the frame yields an empty image.
pub fn crop_region(frame: &RgbaImage, rect: &Rect) -> RgbaImage {
    let (w, h) = (frame.width() as i32, frame.height() as i32);

    let x1 = rect.x1.clamp(0, w);
    let y1 = rect.y1.clamp(0, h);
    let x2 = rect.x2.clamp(x1, w);
    let y2 = rect.y2.clamp(y1, h);

    image::imageops::crop_imm(
        frame,
        x1 as u32,
        y1 as u32,
        (x2 - x1) as u32,
        (y2 - y1) as u32,
    )
    .to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_region() {
        let img = RgbaImage::from_fn(100, 200, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));

        let cropped = crop_region(&img, &Rect::new(10, 50, 60, 70));

        assert_eq!(cropped.dimensions(), (50, 20));
        assert_eq!(cropped.get_pixel(0, 0)[0], 10);
        assert_eq!(cropped.get_pixel(0, 0)[1], 50);
    }

    #[test]
    fn test_crop_region_clamps() {
        let img = RgbaImage::new(100, 100);

        let cropped = crop_region(&img, &Rect::new(90, -5, 150, 10));
        assert_eq!(cropped.dimensions(), (10, 10));

        let outside = crop_region(&img, &Rect::new(120, 120, 150, 150));
        assert_eq!(outside.dimensions(), (0, 0));
    }

    #[test]
    fn test_rect_offset() {
        let rect = Rect::new(140, 0, 460, 62).offset(122, 67);
        assert_eq!(rect, Rect::new(262, 67, 582, 129));
        assert_eq!(rect.width(), 320);
        assert_eq!(rect.height(), 62);
    }

    #[test]
    fn test_load_screenshot_missing_is_io_error() {
        let err = load_screenshot(Path::new("/nonexistent/1273658961.png")).unwrap_err();
        let input = err.chain().find_map(|e| e.downcast_ref::<InputError>());
        assert!(matches!(input, Some(InputError::Io { .. })));
    }

    #[test]
    fn test_load_screenshot_garbage_is_format_error() {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        std::fs::write(file.path(), b"definitely not a png").unwrap();
        let err = load_screenshot(file.path()).unwrap_err();
        let input = err.chain().find_map(|e| e.downcast_ref::<InputError>());
        assert!(matches!(input, Some(InputError::Format { .. })));
    }

    #[test]
    fn test_load_screenshot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        RgbaImage::from_pixel(8, 4, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let img = load_screenshot(&path).unwrap();
        assert_eq!(img.dimensions(), (8, 4));
        assert_eq!(img.get_pixel(3, 2)[2], 30);
    }
}
