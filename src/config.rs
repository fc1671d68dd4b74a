use anyhow::{bail, Result};
use sb_capture::{RegionMap, Shift};
use sb_data::InputError;
use sb_reconcile::{DEFAULT_MAP_DISTANCE, DEFAULT_NAME_DISTANCE, DEFAULT_REGION_DISTANCE};
use sb_vision::icon_classifier::DEFAULT_MAX_DISTANCE;
use sb_vision::{AnchorConfig, OcrSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a run needs besides the screenshot itself.
///
/// Defaults carry the calibrated layout of the reference scoreboard; a config
/// file only needs the keys it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Champion name -> perceptual hash catalog
    pub hash_catalog: PathBuf,
    /// `{"players": [..]}`, used when no player list is supplied
    pub player_whitelist: PathBuf,
    /// `{"maps": [..]}`; `null` disables map reconciliation
    pub map_whitelist: Option<PathBuf>,
    /// `{"regions": [..]}`
    pub region_whitelist: Option<PathBuf>,

    pub regions: RegionMap,
    /// Applied to every player text column
    pub player_shift: Shift,
    /// Applied to every match summary box
    pub match_shift: Shift,
    pub detection: AnchorConfig,

    pub icon_max_distance: u32,
    pub name_max_distance: usize,
    pub map_max_distance: usize,
    pub region_max_distance: usize,

    pub ocr: OcrSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hash_catalog: PathBuf::from("champion_hashes.json"),
            player_whitelist: PathBuf::from("players.json"),
            map_whitelist: Some(PathBuf::from("maps.json")),
            region_whitelist: None,
            regions: RegionMap::default(),
            player_shift: Shift::new(122, 7),
            match_shift: Shift::new(370, 32),
            detection: AnchorConfig::default(),
            icon_max_distance: DEFAULT_MAX_DISTANCE,
            name_max_distance: DEFAULT_NAME_DISTANCE,
            map_max_distance: DEFAULT_MAP_DISTANCE,
            region_max_distance: DEFAULT_REGION_DISTANCE,
            ocr: OcrSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Unreadable, malformed or inconsistent files are fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .map_err(|e| InputError::format(path, e.to_string()))?;
        if let Err(e) = config.validate() {
            return Err(InputError::format(path, e.to_string()).into());
        }
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let required = self.detection.required_rows();
        if required == 0 {
            bail!("rows_per_team must be at least 1");
        }
        if self.detection.fallback_anchors.len() < required {
            bail!(
                "fallback_anchors has {} entries, need {} ({} rows per team)",
                self.detection.fallback_anchors.len(),
                required,
                self.detection.rows_per_team
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection.fallback_anchors.len(), 10);
        assert_eq!(config.player_shift, Shift::new(122, 7));
        assert_eq!(config.name_max_distance, 3);
    }

    #[test]
    fn test_partial_file_overrides_only_named_keys() {
        let file = write_config(
            r#"{"match_shift": {"x": 10, "y": 0}, "detection": {"binarize_threshold": 180}, "map_whitelist": null}"#,
        );
        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.match_shift, Shift::new(10, 0));
        assert_eq!(config.detection.binarize_threshold, 180);
        assert_eq!(config.detection.rows_per_team, 5);
        assert!(config.map_whitelist.is_none());
        assert_eq!(config.hash_catalog, PathBuf::from("champion_hashes.json"));
    }

    #[test]
    fn test_short_fallback_list_is_format_error() {
        let file = write_config(r#"{"detection": {"fallback_anchors": [1, 2, 3]}}"#);
        let err = PipelineConfig::load(file.path()).unwrap_err();
        let input = err.chain().find_map(|e| e.downcast_ref::<InputError>());
        assert!(matches!(input, Some(InputError::Format { .. })));
    }

    #[test]
    fn test_missing_config_is_io_error() {
        let err = PipelineConfig::load(Path::new("/nonexistent/config.json")).unwrap_err();
        let input = err.chain().find_map(|e| e.downcast_ref::<InputError>());
        assert!(matches!(input, Some(InputError::Io { .. })));
    }

    #[test]
    fn test_malformed_config_is_format_error() {
        let file = write_config("{ not json");
        let err = PipelineConfig::load(file.path()).unwrap_err();
        let input = err.chain().find_map(|e| e.downcast_ref::<InputError>());
        assert!(matches!(input, Some(InputError::Format { .. })));
    }
}
