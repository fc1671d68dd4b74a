use anyhow::Result;
use image::RgbaImage;
use sb_data::{CatalogEntry, HashCatalog, PerceptualHash, UNKNOWN};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::phash::perceptual_hash;

/// Default maximum Hamming distance for an accepted icon match
pub const DEFAULT_MAX_DISTANCE: u32 = 20;

/// Result of classifying one champion portrait
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconMatch {
    /// Catalog name, or `"Unknown"` when the nearest entry is too far away
    pub champion: String,
    /// Distance to the nearest catalog entry, if there was one
    pub distance: Option<u32>,
}

impl IconMatch {
    fn unknown(distance: Option<u32>) -> Self {
        Self {
            champion: UNKNOWN.to_string(),
            distance,
        }
    }

    pub fn is_known(&self) -> bool {
        self.champion != UNKNOWN
    }
}

/// Identifies champion portraits by nearest perceptual hash in a catalog
pub struct IconClassifier {
    catalog: HashCatalog,
    max_distance: u32,
}

impl IconClassifier {
    pub fn new(catalog: HashCatalog, max_distance: u32) -> Self {
        Self {
            catalog,
            max_distance,
        }
    }

    /// Load the hash catalog file produced by the icon normalization job.
    pub fn load(catalog_path: &Path, max_distance: u32) -> Result<Self> {
        let catalog = HashCatalog::load(catalog_path)?;
        if catalog.is_empty() {
            warn!(
                "Hash catalog {} is empty; every champion will be {}",
                catalog_path.display(),
                UNKNOWN
            );
        }
        info!(
            "IconClassifier ready: {} hashes, max distance {}",
            catalog.len(),
            max_distance
        );
        Ok(Self::new(catalog, max_distance))
    }

    /// Classify a cropped portrait. Never fails: anything that cannot be
    /// matched within the distance threshold is `"Unknown"`.
    pub fn classify(&self, region: &RgbaImage) -> IconMatch {
        let Some(hash) = perceptual_hash(region) else {
            warn!("Empty icon region; champion set to {}", UNKNOWN);
            return IconMatch::unknown(None);
        };

        match self.nearest(&hash) {
            Some((entry, distance)) if distance <= self.max_distance => {
                debug!(
                    "Icon {} -> {} (distance {})",
                    hash.to_hex(),
                    entry.name,
                    distance
                );
                IconMatch {
                    champion: entry.name.clone(),
                    distance: Some(distance),
                }
            }
            Some((entry, distance)) => {
                warn!(
                    "Icon {} unmatched: nearest {} at distance {} > {}",
                    hash.to_hex(),
                    entry.name,
                    distance,
                    self.max_distance
                );
                IconMatch::unknown(Some(distance))
            }
            None => IconMatch::unknown(None),
        }
    }

    /// Linear scan for the nearest catalog entry. Ties keep the entry seen
    /// first, i.e. the earlier one in catalog file order.
    pub fn nearest(&self, hash: &PerceptualHash) -> Option<(&CatalogEntry, u32)> {
        let mut best: Option<(&CatalogEntry, u32)> = None;
        for entry in self.catalog.entries() {
            let distance = hash.distance(&entry.hash);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((entry, distance));
            }
        }
        best
    }

    /// Number of catalog entries
    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }
}
