use image::{GrayImage, RgbaImage};
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};
use std::process::Command;
use tracing::{debug, warn};

use crate::phash::luma;

/// What kind of text a region holds; selects recognition options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextHint {
    /// Player names: letters, digits, accented letters
    Name,
    /// Stat columns: digits, thousands separators and `/`
    Numeric,
    /// Match summary text, unrestricted
    Free,
}

/// A text-recognition backend. Implementations may return garbage; the
/// reconciliation stages deal with it.
pub trait TextEngine {
    /// Recognize a single line of text in a normalized (binary) image.
    /// `None` means the engine produced nothing usable.
    fn recognize(&self, image: &GrayImage, hint: TextHint) -> Option<String>;
}

/// Tesseract invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract executable name or full path
    pub tesseract_cmd: String,
    /// Page segmentation mode (7 = single text line)
    pub psm: u32,
    pub language: String,
    pub name_charset: String,
    pub numeric_charset: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            psm: 7,
            language: "eng".to_string(),
            name_charset:
                "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789öéàáèíòóùúÄÖÜäöüÉ"
                    .to_string(),
            numeric_charset: "0123456789,/".to_string(),
        }
    }
}

/// Runs the Tesseract CLI on each region.
/// Falls back gracefully when Tesseract is not installed.
pub struct TesseractEngine {
    settings: OcrSettings,
    available: bool,
}

impl TesseractEngine {
    pub fn new(settings: OcrSettings) -> Self {
        let available = check_tesseract(&settings.tesseract_cmd);
        if available {
            debug!("Tesseract OCR available at {}", settings.tesseract_cmd);
        } else {
            warn!(
                "Tesseract not found ({}). Text fields will be empty.",
                settings.tesseract_cmd
            );
        }
        Self {
            settings,
            available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn charset(&self, hint: TextHint) -> Option<&str> {
        match hint {
            TextHint::Name => Some(&self.settings.name_charset),
            TextHint::Numeric => Some(&self.settings.numeric_charset),
            TextHint::Free => None,
        }
    }
}

impl TextEngine for TesseractEngine {
    fn recognize(&self, image: &GrayImage, hint: TextHint) -> Option<String> {
        if !self.available {
            return None;
        }

        let input = tempfile::Builder::new()
            .prefix("scoreboard_ocr_")
            .suffix(".png")
            .tempfile()
            .ok()?;
        if let Err(e) = image.save(input.path()) {
            warn!("Failed to write OCR input: {}", e);
            return None;
        }

        let mut cmd = Command::new(&self.settings.tesseract_cmd);
        cmd.arg(input.path())
            .arg("stdout")
            .arg("--psm")
            .arg(self.settings.psm.to_string())
            .arg("-l")
            .arg(&self.settings.language);
        if let Some(charset) = self.charset(hint).filter(|c| !c.is_empty()) {
            cmd.arg("-c")
                .arg(format!("tessedit_char_whitelist={}", charset));
        }

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to run tesseract: {}", e);
                return None;
            }
        };
        if !output.status.success() {
            debug!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("OCR result: '{}'", text);
        Some(text)
    }
}

/// Normalizes regions and hands them to a [`TextEngine`].
pub struct TextExtractor {
    engine: Box<dyn TextEngine>,
}

impl TextExtractor {
    pub fn new(engine: Box<dyn TextEngine>) -> Self {
        Self { engine }
    }

    /// Read the raw text of a region. Never fails; an empty region or a
    /// silent engine yields an empty string.
    pub fn read(&self, region: &RgbaImage, hint: TextHint) -> String {
        if region.width() == 0 || region.height() == 0 {
            return String::new();
        }
        let normalized = normalize_for_ocr(region);
        self.engine
            .recognize(&normalized, hint)
            .unwrap_or_default()
    }
}

/// Gaussian-weighted neighbourhood used by the adaptive threshold (11x11 block)
const THRESHOLD_SIGMA: f32 = 2.0;
/// Offset subtracted from the local mean
const THRESHOLD_OFFSET: f32 = 2.0;
/// Light denoising blur (3x3 kernel)
const DENOISE_SIGMA: f32 = 0.8;

/// Pre-process a region for OCR:
/// 1. Convert to grayscale
/// 2. Light Gaussian blur
/// 3. Gaussian adaptive threshold (pixel brighter than its local mean minus
///    an offset becomes white)
/// 4. 2x2 dilation of the white areas
pub fn normalize_for_ocr(region: &RgbaImage) -> GrayImage {
    let gray = luma(region);
    let blurred = gaussian_blur_f32(&gray, DENOISE_SIGMA);
    let local_mean = gaussian_blur_f32(&blurred, THRESHOLD_SIGMA);

    let (w, h) = blurred.dimensions();
    let binary = GrayImage::from_fn(w, h, |x, y| {
        let pixel = blurred.get_pixel(x, y)[0] as f32;
        let mean = local_mean.get_pixel(x, y)[0] as f32;
        if pixel > mean - THRESHOLD_OFFSET {
            image::Luma([255u8])
        } else {
            image::Luma([0u8])
        }
    });

    dilate_2x2(&binary)
}

/// Each pixel takes the maximum of itself and its right, lower and
/// lower-right neighbours.
fn dilate_2x2(img: &GrayImage) -> GrayImage {
    let (w, h) = img.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let mut max = img.get_pixel(x, y)[0];
        if x + 1 < w {
            max = max.max(img.get_pixel(x + 1, y)[0]);
        }
        if y + 1 < h {
            max = max.max(img.get_pixel(x, y + 1)[0]);
        }
        if x + 1 < w && y + 1 < h {
            max = max.max(img.get_pixel(x + 1, y + 1)[0]);
        }
        image::Luma([max])
    })
}

/// Check if Tesseract is installed and accessible
fn check_tesseract(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
