use image::{GrayImage, RgbaImage};
use imageproc::contours::{find_contours, BorderType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::phash::luma;

/// Row detection parameters and the calibrated fallback anchors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Player rows per team
    pub rows_per_team: usize,
    /// Pixels at or below this luma count as foreground (portraits are dark
    /// against the bright row background)
    pub binarize_threshold: u8,
    /// Exclusive bounds on a portrait's bounding-box width
    pub icon_width: (u32, u32),
    /// Exclusive bounds on a portrait's bounding-box height
    pub icon_height: (u32, u32),
    /// Portraits start left of this x
    pub max_left: u32,
    /// Distance from a portrait's top edge down to the row anchor
    pub icon_top_offset: i32,
    /// Row anchors used when detection is insufficient, team 1 then team 2
    pub fallback_anchors: Vec<i32>,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            rows_per_team: 5,
            binarize_threshold: 200,
            icon_width: (180, 260),
            icon_height: (80, 120),
            max_left: 80,
            icon_top_offset: 4,
            fallback_anchors: vec![60, 180, 302, 422, 544, 927, 1042, 1160, 1274, 1392],
        }
    }
}

impl AnchorConfig {
    /// Rows needed for a complete scoreboard (both teams)
    pub fn required_rows(&self) -> usize {
        self.rows_per_team * 2
    }
}

/// Bounding box of a detected portrait candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Outcome of the single detection attempt on a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Enough portraits found; boxes sorted top to bottom, truncated to the
    /// required row count
    Sufficient(Vec<BoxRect>),
    /// Too few portraits; detection results are discarded
    Insufficient { found: usize },
}

/// Where the anchors of a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    Detected,
    Fallback,
}

/// Ordered row anchors, one per row, team 1 first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorList {
    pub anchors: Vec<i32>,
    pub source: AnchorSource,
    /// Number of candidate boxes that passed the portrait filter
    pub found: usize,
}

/// Locates the top of every player row from the champion portrait column.
pub struct RowAnchorDetector {
    config: AnchorConfig,
}

impl RowAnchorDetector {
    pub fn new(config: AnchorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Binarize, trace outer contours and keep the boxes that look like portraits.
    pub fn detect(&self, frame: &RgbaImage) -> Detection {
        let required = self.config.required_rows();
        let mut boxes = self.portrait_boxes(frame);
        boxes.sort_by_key(|b| b.y);

        debug!("Portrait detection: {} candidate box(es), need {}", boxes.len(), required);

        if boxes.len() < required {
            return Detection::Insufficient { found: boxes.len() };
        }
        boxes.truncate(required);
        Detection::Sufficient(boxes)
    }

    /// Detect row anchors, substituting the configured fallback list when
    /// detection is insufficient. Always yields exactly `required_rows` anchors
    /// as long as the fallback list is long enough.
    pub fn anchors(&self, frame: &RgbaImage) -> AnchorList {
        match self.detect(frame) {
            Detection::Sufficient(boxes) => {
                let anchors: Vec<i32> = boxes
                    .iter()
                    .map(|b| b.y as i32 + self.config.icon_top_offset)
                    .collect();
                debug!("Detected row anchors: {:?}", anchors);
                AnchorList {
                    found: boxes.len(),
                    anchors,
                    source: AnchorSource::Detected,
                }
            }
            Detection::Insufficient { found } => {
                let anchors: Vec<i32> = self
                    .config
                    .fallback_anchors
                    .iter()
                    .copied()
                    .take(self.config.required_rows())
                    .collect();
                warn!(
                    "Only {} portrait(s) detected (need {}); using configured row anchors",
                    found,
                    self.config.required_rows()
                );
                AnchorList {
                    anchors,
                    source: AnchorSource::Fallback,
                    found,
                }
            }
        }
    }

    fn portrait_boxes(&self, frame: &RgbaImage) -> Vec<BoxRect> {
        let binary = binarize_inverted(frame, self.config.binarize_threshold);
        let (w_lo, w_hi) = self.config.icon_width;
        let (h_lo, h_hi) = self.config.icon_height;

        find_contours::<u32>(&binary)
            .into_iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
            .filter_map(|c| bounding_box(&c.points))
            .filter(|b| {
                b.width > w_lo
                    && b.width < w_hi
                    && b.height > h_lo
                    && b.height < h_hi
                    && b.x < self.config.max_left
            })
            .collect()
    }
}

/// Dark pixels become foreground (255), bright pixels background (0).
fn binarize_inverted(frame: &RgbaImage, threshold: u8) -> GrayImage {
    let gray = luma(frame);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > threshold {
            image::Luma([0u8])
        } else {
            image::Luma([255u8])
        }
    })
}

fn bounding_box(points: &[imageproc::point::Point<u32>]) -> Option<BoxRect> {
    let first = points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(BoxRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}
