pub mod anchors;
pub mod icon_classifier;
pub mod phash;
pub mod text_reader;

pub use anchors::{AnchorConfig, AnchorList, AnchorSource, Detection, RowAnchorDetector};
pub use icon_classifier::{IconClassifier, IconMatch};
pub use phash::perceptual_hash;
pub use text_reader::{
    normalize_for_ocr, OcrSettings, TesseractEngine, TextEngine, TextExtractor, TextHint,
};
