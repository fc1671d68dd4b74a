use sb_vision::AnchorSource;
use serde::Serialize;
use std::fmt;

/// Per-run counters, printed after a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub anchor_source: AnchorSource,
    /// Portrait boxes that passed the detection filter
    pub portraits_found: usize,
    pub first_pass_matches: usize,
    pub recovered: usize,
    pub unresolved: usize,
    pub unknown_champions: usize,
    pub synthetic_rows: usize,
}

impl RunSummary {
    /// Whether every row got a pool name and every champion was identified
    pub fn is_clean(&self) -> bool {
        self.unresolved == 0 && self.unknown_champions == 0 && self.synthetic_rows == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.anchor_source {
            AnchorSource::Detected => "detected",
            AnchorSource::Fallback => "fallback",
        };
        writeln!(
            f,
            "{} rows ({} anchors, {} portraits found)",
            self.rows, source, self.portraits_found
        )?;
        writeln!(
            f,
            "names: {} matched, {} recovered, {} unresolved",
            self.first_pass_matches, self.recovered, self.unresolved
        )?;
        write!(
            f,
            "champions: {} unknown; unplaced candidates: {}",
            self.unknown_champions, self.synthetic_rows
        )
    }
}
