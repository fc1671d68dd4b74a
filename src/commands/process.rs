use anyhow::{Context, Result};
use sb_data::InputError;
use sb_reconcile::CandidatePool;
use sb_state::ScoreboardRecord;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::PipelineConfig;
use crate::pipeline::{match_id_from_path, ScoreboardReader};
use crate::summary::RunSummary;

/// One invocation of the reader on a single screenshot
#[derive(Debug, Clone, Default)]
pub struct ProcessRequest {
    pub image: PathBuf,
    /// One name per line; `-` reads the list from stdin. Without it the
    /// configured player whitelist seeds the pool.
    pub players: Option<PathBuf>,
    pub config: Option<PathBuf>,
    /// Defaults to `<image-stem>.json` next to the image
    pub output: Option<PathBuf>,
    /// Overrides the id taken from the image file name
    pub match_id: Option<u64>,
}

#[derive(Debug)]
pub struct ProcessOutcome {
    pub output: PathBuf,
    pub record: ScoreboardRecord,
    pub summary: RunSummary,
}

/// Read one screenshot and write its record as pretty JSON.
pub fn process(request: &ProcessRequest) -> Result<ProcessOutcome> {
    let config = match &request.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let reader = ScoreboardReader::from_config(&config)?;
    let mut pool = load_pool(request.players.as_deref(), &config)?;

    let frame = sb_capture::load_screenshot(&request.image)?;
    info!(
        "Loaded {} ({}x{})",
        request.image.display(),
        frame.width(),
        frame.height()
    );

    let match_id = request.match_id.or_else(|| match_id_from_path(&request.image));
    let (record, summary) = reader
        .read(&frame, match_id, &mut pool)
        .with_context(|| format!("Failed to read scoreboard {}", request.image.display()))?;

    let output = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&request.image));
    write_record(&output, &record)?;
    info!("Wrote {}", output.display());

    Ok(ProcessOutcome {
        output,
        record,
        summary,
    })
}

/// Candidate pool for one run: the supplied list, or the configured whitelist.
pub fn load_pool(players: Option<&Path>, config: &PipelineConfig) -> Result<CandidatePool> {
    let names = match players {
        Some(path) if path == Path::new("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read player list from stdin")?;
            sb_data::parse_player_list(&text)
        }
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            sb_data::parse_player_list(&text)
        }
        None => sb_data::load_player_whitelist(&config.player_whitelist)
            .context("Failed to load player whitelist")?,
    };
    Ok(CandidatePool::new(names))
}

pub fn default_output_path(image: &Path) -> PathBuf {
    image.with_extension("json")
}

fn write_record(path: &Path, record: &ScoreboardRecord) -> Result<()> {
    let json = record.to_json_pretty()?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use sb_data::UNKNOWN;

    struct Fixture {
        dir: tempfile::TempDir,
        config: PathBuf,
    }

    impl Fixture {
        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }
    }

    fn fixture(players: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: String| {
            let path = dir.path().join(name);
            std::fs::write(&path, body).unwrap();
            path
        };

        let catalog = write("champion_hashes.json", "{}".to_string());
        let whitelist = write(
            "players.json",
            serde_json::json!({ "players": players }).to_string(),
        );
        let maps = write("maps.json", r#"{"maps": ["Frog Isle"]}"#.to_string());
        let config = write(
            "config.json",
            serde_json::json!({
                "hash_catalog": catalog,
                "player_whitelist": whitelist,
                "map_whitelist": maps,
                "ocr": { "tesseract_cmd": "/nonexistent/tesseract" },
            })
            .to_string(),
        );

        RgbaImage::from_pixel(2300, 1520, image::Rgba([255, 255, 255, 255]))
            .save(dir.path().join("1273658961.png"))
            .unwrap();

        Fixture { dir, config }
    }

    const TEN: [&str; 10] = [
        "ComradeNick", "Viktor", "Zhin", "Ash", "Barik",
        "Fernando", "Makoa", "Inara", "Ruckus", "Torvald",
    ];

    #[test]
    fn test_process_writes_record_next_to_image() {
        let fx = fixture(&TEN);
        let request = ProcessRequest {
            image: fx.path("1273658961.png"),
            config: Some(fx.config.clone()),
            ..ProcessRequest::default()
        };

        let outcome = process(&request).unwrap();
        assert_eq!(outcome.output, fx.path("1273658961.json"));
        assert_eq!(outcome.record.teams.team1.len(), 5);
        assert_eq!(outcome.record.teams.team2.len(), 5);
        assert_eq!(outcome.summary.recovered, 10);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&outcome.output).unwrap()).unwrap();
        assert_eq!(written["match"]["match_id"], 1273658961u64);
        assert_eq!(written["match"]["won"], false);
        assert_eq!(written["teams"]["team1"][0]["champion"], UNKNOWN);
        assert!(written.get("unplaced").is_none());
    }

    #[test]
    fn test_player_list_file_overrides_whitelist() {
        let fx = fixture(&TEN);
        let list = fx.path("expected.txt");
        std::fs::write(&list, "Alpha\nBravo\n\nCharlie\n").unwrap();

        let request = ProcessRequest {
            image: fx.path("1273658961.png"),
            players: Some(list),
            config: Some(fx.config.clone()),
            output: Some(fx.path("out.json")),
            match_id: Some(42),
        };
        let outcome = process(&request).unwrap();

        assert_eq!(outcome.output, fx.path("out.json"));
        assert_eq!(outcome.record.match_info.match_id, Some(42));
        let names: Vec<&str> = outcome.record.players().map(|p| p.name.as_str()).collect();
        for expected in ["Alpha", "Bravo", "Charlie"] {
            assert_eq!(names.iter().filter(|n| **n == expected).count(), 1);
        }
        // Three candidates for ten rows: seven rows keep their (empty) text
        assert_eq!(outcome.summary.unresolved, 7);
    }

    #[test]
    fn test_missing_image_is_io_error() {
        let fx = fixture(&TEN);
        let request = ProcessRequest {
            image: fx.path("missing.png"),
            config: Some(fx.config.clone()),
            ..ProcessRequest::default()
        };
        let err = process(&request).unwrap_err();
        let input = err.chain().find_map(|e| e.downcast_ref::<InputError>());
        assert!(matches!(input, Some(InputError::Io { .. })));
    }

    #[test]
    fn test_bad_whitelist_schema_is_format_error() {
        let fx = fixture(&TEN);
        std::fs::write(fx.path("players.json"), r#"{"names": ["Ash"]}"#).unwrap();
        let request = ProcessRequest {
            image: fx.path("1273658961.png"),
            config: Some(fx.config.clone()),
            ..ProcessRequest::default()
        };
        let err = process(&request).unwrap_err();
        let input = err.chain().find_map(|e| e.downcast_ref::<InputError>());
        assert!(matches!(input, Some(InputError::Format { .. })));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/shots/1273658961.png")),
            PathBuf::from("/shots/1273658961.json")
        );
    }
}
