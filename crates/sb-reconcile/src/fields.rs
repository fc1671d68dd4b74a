use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::distance;

/// Default maximum edit distance for map name reconciliation
pub const DEFAULT_MAP_DISTANCE: usize = 6;
/// Default maximum edit distance for region reconciliation
pub const DEFAULT_REGION_DISTANCE: usize = 3;

static KDA_RE: OnceLock<Option<Regex>> = OnceLock::new();
static LEADING_INT_RE: OnceLock<Option<Regex>> = OnceLock::new();
static TRAILING_INT_RE: OnceLock<Option<Regex>> = OnceLock::new();
static NAME_JUNK_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Kills, deaths and assists of one row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kda {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

/// Integer stat: thousands separators and whitespace are dropped, the rest
/// must be all digits. Anything else is 0.
pub fn parse_int(text: &str) -> u32 {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        if !text.trim().is_empty() {
            debug!("Integer field '{}' unparseable, using 0", text);
        }
        return 0;
    }
    cleaned.parse().unwrap_or_else(|_| {
        warn!("Integer field '{}' out of range, using 0", text);
        0
    })
}

/// `kills/deaths/assists`; whitespace is ignored, trailing characters after
/// the third number are tolerated. Anything else is all zeros.
pub fn parse_kda(text: &str) -> Kda {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let parsed = cached(&KDA_RE, r"^(\d+)/(\d+)/(\d+)")
        .and_then(|re| re.captures(&compact))
        .and_then(|caps| {
            Some(Kda {
                kills: caps[1].parse().ok()?,
                deaths: caps[2].parse().ok()?,
                assists: caps[3].parse().ok()?,
            })
        });
    parsed.unwrap_or_else(|| {
        debug!("KDA field '{}' unparseable, using 0/0/0", text);
        Kda::default()
    })
}

/// Match duration in minutes: the first integer in the text (`"12 minutes"`)
pub fn parse_duration(text: &str) -> u32 {
    cached(&LEADING_INT_RE, r"\d+")
        .and_then(|re| re.find(text))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Team score: the integer the text ends with (`"Score 4"`)
pub fn parse_score(text: &str) -> u32 {
    cached(&TRAILING_INT_RE, r"(\d+)$")
        .and_then(|re| re.captures(text.trim_end()))
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Drop everything that is neither a word character nor whitespace, then trim.
pub fn sanitize_name(text: &str) -> String {
    match cached(&NAME_JUNK_RE, r"[^\w\s]") {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Nearest whitelist entry within `max_distance`, otherwise the text as read.
/// The whitelist is not consumed.
pub fn reconcile_free_text(text: &str, whitelist: &[String], max_distance: usize) -> String {
    let text = text.trim();
    if text.is_empty() || whitelist.is_empty() {
        return text.to_string();
    }
    match distance::nearest(text, whitelist.iter().map(String::as_str)) {
        Some((index, distance)) if distance <= max_distance => {
            debug!("'{}' -> '{}' (distance {})", text, whitelist[index], distance);
            whitelist[index].clone()
        }
        Some((index, distance)) => {
            warn!(
                "'{}' unmatched, nearest '{}' at distance {} > {}",
                text, whitelist[index], distance, max_distance
            );
            text.to_string()
        }
        None => text.to_string(),
    }
}

/// Free-text match fields reconciled against optional whitelists.
#[derive(Debug, Clone, Default)]
pub struct FieldParser {
    maps: Vec<String>,
    regions: Vec<String>,
    map_distance: usize,
    region_distance: usize,
}

impl FieldParser {
    pub fn new(maps: Vec<String>, map_distance: usize) -> Self {
        Self {
            maps,
            regions: Vec::new(),
            map_distance,
            region_distance: DEFAULT_REGION_DISTANCE,
        }
    }

    pub fn with_regions(mut self, regions: Vec<String>, max_distance: usize) -> Self {
        self.regions = regions;
        self.region_distance = max_distance;
        self
    }

    pub fn map(&self, text: &str) -> String {
        reconcile_free_text(text, &self.maps, self.map_distance)
    }

    pub fn region(&self, text: &str) -> String {
        reconcile_free_text(text, &self.regions, self.region_distance)
    }
}
