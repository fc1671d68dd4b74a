use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;
use tracing::{debug, info, warn};

use sb_capture::{crop_region, MatchField, PlayerField, RegionMap, Shift};
use sb_reconcile::{
    parse_duration, parse_int, parse_kda, parse_score, sanitize_name, CandidatePool,
    FieldParser, NameResolver,
};
use sb_state::{MatchAssembler, MatchInfo, PlayerRecord, ScoreboardRecord};
use sb_vision::{IconClassifier, RowAnchorDetector, TesseractEngine, TextExtractor, TextHint};

use crate::config::PipelineConfig;
use crate::summary::RunSummary;

/// Screenshot -> scoreboard record.
///
/// Holds the loaded catalog and whitelists; the candidate pool is supplied
/// per run so nothing carries over between screenshots.
pub struct ScoreboardReader {
    regions: RegionMap,
    player_shift: Shift,
    match_shift: Shift,
    detector: RowAnchorDetector,
    classifier: IconClassifier,
    text: TextExtractor,
    fields: FieldParser,
    name_max_distance: usize,
}

impl ScoreboardReader {
    pub fn new(
        config: &PipelineConfig,
        classifier: IconClassifier,
        text: TextExtractor,
        fields: FieldParser,
    ) -> Self {
        Self {
            regions: config.regions.clone(),
            player_shift: config.player_shift,
            match_shift: config.match_shift,
            detector: RowAnchorDetector::new(config.detection.clone()),
            classifier,
            text,
            fields,
            name_max_distance: config.name_max_distance,
        }
    }

    /// Load the hash catalog and whitelists named in `config` and use
    /// Tesseract for text recognition.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        let classifier = IconClassifier::load(&config.hash_catalog, config.icon_max_distance)
            .context("Failed to load champion hash catalog")?;

        let maps = match &config.map_whitelist {
            Some(path) => {
                sb_data::load_map_whitelist(path).context("Failed to load map whitelist")?
            }
            None => Vec::new(),
        };
        let regions = match &config.region_whitelist {
            Some(path) => {
                sb_data::load_region_whitelist(path).context("Failed to load region whitelist")?
            }
            None => Vec::new(),
        };
        let fields = FieldParser::new(maps, config.map_max_distance)
            .with_regions(regions, config.region_max_distance);

        let text = TextExtractor::new(Box::new(TesseractEngine::new(config.ocr.clone())));
        Ok(Self::new(config, classifier, text, fields))
    }

    /// Run the whole pipeline on one screenshot. `pool` is consumed as rows
    /// are reconciled; whatever is left ends up in `unplaced`.
    pub fn read(
        &self,
        frame: &RgbaImage,
        match_id: Option<u64>,
        pool: &mut CandidatePool,
    ) -> Result<(ScoreboardRecord, RunSummary)> {
        let anchors = self.detector.anchors(frame);
        debug!("Row anchors ({:?}): {:?}", anchors.source, anchors.anchors);

        let mut resolver = NameResolver::new(self.name_max_distance);
        let mut rows = Vec::with_capacity(anchors.anchors.len());
        let mut unknown_champions = 0;

        for (row, &anchor) in anchors.anchors.iter().enumerate() {
            let icon_rect = self.regions.absolute_rect(PlayerField::Icon, anchor, Shift::ZERO);
            let icon = self.classifier.classify(&crop_region(frame, &icon_rect));
            if !icon.is_known() {
                unknown_champions += 1;
            }

            let mut record = PlayerRecord {
                champion: icon.champion,
                ..PlayerRecord::default()
            };
            for field in PlayerField::TEXT_COLUMNS {
                let raw = self.read_player_field(frame, field, anchor);
                debug!("Row {} {}: '{}'", row, field.key(), raw);
                match field {
                    PlayerField::Player => {
                        record.name = resolver.resolve(row, &sanitize_name(&raw), pool);
                    }
                    PlayerField::Kda => {
                        let kda = parse_kda(&raw);
                        record.kills = kda.kills;
                        record.deaths = kda.deaths;
                        record.assists = kda.assists;
                    }
                    PlayerField::Credits => record.credits = parse_int(&raw),
                    PlayerField::Damage => record.damage = parse_int(&raw),
                    PlayerField::Taken => record.taken = parse_int(&raw),
                    PlayerField::ObjectiveTime => record.objective_time = parse_int(&raw),
                    PlayerField::Shielding => record.shielding = parse_int(&raw),
                    PlayerField::Healing => record.healing = parse_int(&raw),
                    PlayerField::Icon => {}
                }
            }
            rows.push(record);
        }

        let reconciliation = resolver.finish(pool);
        for recovery in &reconciliation.recovered {
            if let Some(record) = rows.get_mut(recovery.row) {
                record.name = recovery.name.clone();
            }
        }
        let unplaced: Vec<PlayerRecord> = reconciliation
            .leftover
            .iter()
            .map(|name| PlayerRecord::named(name.as_str()))
            .collect();

        let match_info = self.read_match_info(frame, match_id);

        let summary = RunSummary {
            rows: rows.len(),
            anchor_source: anchors.source,
            portraits_found: anchors.found,
            first_pass_matches: reconciliation.first_pass_matches,
            recovered: reconciliation.recovered.len(),
            unresolved: reconciliation.unresolved.len(),
            unknown_champions,
            synthetic_rows: unplaced.len(),
        };

        let record = MatchAssembler::new(self.detector.config().rows_per_team)
            .assemble(rows, match_info, unplaced)?;
        info!(
            "Scoreboard read: {} rows, {} name(s) recovered, {} unknown champion(s)",
            summary.rows, summary.recovered, summary.unknown_champions
        );
        Ok((record, summary))
    }

    fn read_player_field(&self, frame: &RgbaImage, field: PlayerField, anchor: i32) -> String {
        let rect = self.regions.absolute_rect(field, anchor, self.player_shift);
        let hint = match field {
            PlayerField::Player => TextHint::Name,
            _ => TextHint::Numeric,
        };
        self.text.read(&crop_region(frame, &rect), hint)
    }

    fn read_match_info(&self, frame: &RgbaImage, match_id: Option<u64>) -> MatchInfo {
        let [duration, region, map, team1, team2] = MatchField::ALL.map(|field| {
            let rect = self.regions.match_rect(field, self.match_shift);
            let text = self.text.read(&crop_region(frame, &rect), TextHint::Free);
            debug!("Match {}: '{}'", field.key(), text);
            text
        });

        MatchInfo::new(
            parse_duration(&duration),
            self.fields.region(&region),
            self.fields.map(&map),
            parse_score(&team1),
            parse_score(&team2),
            match_id,
        )
    }
}

/// Match id from the screenshot's file name: every digit in it, in order.
pub fn match_id_from_path(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_string_lossy();
    let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    match digits.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!("Match id '{}' from {} out of range", digits, path.display());
            None
        }
    }
}
