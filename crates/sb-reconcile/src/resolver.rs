use serde::{Deserialize, Serialize};
use strsim::levenshtein;
use tracing::{debug, info, warn};

use crate::pool::CandidatePool;

/// Default maximum edit distance for a first-pass name match
pub const DEFAULT_NAME_DISTANCE: usize = 3;

/// A row whose text did not reconcile in the first pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedRow {
    pub row: usize,
    pub raw: String,
}

/// A second-pass assignment of a pool name to an unmatched row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recovery {
    pub row: usize,
    pub raw: String,
    pub name: String,
    pub distance: usize,
}

/// Outcome of both reconciliation passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub first_pass_matches: usize,
    pub recovered: Vec<Recovery>,
    /// Rows that keep their raw text (pool exhausted)
    pub unresolved: Vec<UnmatchedRow>,
    /// Pool names no row was reconciled with
    pub leftover: Vec<String>,
}

impl Reconciliation {
    /// Resolved name for `row` if the second pass assigned one
    pub fn recovered_name(&self, row: usize) -> Option<&str> {
        self.recovered
            .iter()
            .find(|r| r.row == row)
            .map(|r| r.name.as_str())
    }
}

/// Reconciles recognized player names against a run's candidate pool.
///
/// Call [`resolve`](Self::resolve) once per row in row order, then
/// [`finish`](Self::finish) to run the second pass.
#[derive(Debug)]
pub struct NameResolver {
    max_distance: usize,
    unmatched: Vec<UnmatchedRow>,
    first_pass_matches: usize,
}

impl NameResolver {
    pub fn new(max_distance: usize) -> Self {
        Self {
            max_distance,
            unmatched: Vec::new(),
            first_pass_matches: 0,
        }
    }

    /// First pass for one row. Returns the pool name when the nearest remaining
    /// candidate is within the threshold (and consumes it), otherwise records
    /// the row as unmatched and returns the raw text unchanged.
    pub fn resolve(&mut self, row: usize, raw_text: &str, pool: &mut CandidatePool) -> String {
        // Blank text would match any short name
        let nearest = if raw_text.is_empty() {
            None
        } else {
            pool.nearest(raw_text)
        };

        match nearest {
            Some((index, distance)) if distance <= self.max_distance => {
                if let Some(name) = pool.take(index) {
                    debug!("Row {}: '{}' -> '{}' (distance {})", row, raw_text, name, distance);
                    self.first_pass_matches += 1;
                    return name;
                }
            }
            Some((index, distance)) => {
                warn!(
                    "Row {}: '{}' unmatched, nearest '{}' at distance {} > {}",
                    row,
                    raw_text,
                    pool.remaining()[index],
                    distance,
                    self.max_distance
                );
            }
            None => {
                warn!("Row {}: '{}' unmatched, no candidate available", row, raw_text);
            }
        }

        self.unmatched.push(UnmatchedRow {
            row,
            raw: raw_text.to_string(),
        });
        raw_text.to_string()
    }

    /// Rows recorded as unmatched so far
    pub fn unmatched(&self) -> &[UnmatchedRow] {
        &self.unmatched
    }

    /// Second pass: repeatedly pair the unmatched row and remaining candidate
    /// with the smallest edit distance, consuming both, until either side runs
    /// out. Ties go to the earlier unmatched row, then the earlier candidate.
    /// Whatever is left in the pool afterwards is returned as `leftover`.
    pub fn finish(self, pool: &mut CandidatePool) -> Reconciliation {
        let candidates = pool.drain();
        let mut rows: Vec<Option<UnmatchedRow>> = self.unmatched.into_iter().map(Some).collect();
        let mut names: Vec<Option<String>> = candidates.into_iter().map(Some).collect();

        let distances: Vec<Vec<usize>> = rows
            .iter()
            .flatten()
            .map(|r| {
                names
                    .iter()
                    .flatten()
                    .map(|n| levenshtein(&r.raw, n))
                    .collect()
            })
            .collect();

        let mut recovered = Vec::new();
        loop {
            let mut best: Option<(usize, usize, usize)> = None;
            for (i, row) in rows.iter().enumerate() {
                if row.is_none() {
                    continue;
                }
                for (j, name) in names.iter().enumerate() {
                    if name.is_none() {
                        continue;
                    }
                    let distance = distances[i][j];
                    if best.map_or(true, |(_, _, d)| distance < d) {
                        best = Some((i, j, distance));
                    }
                }
            }

            let Some((i, j, distance)) = best else {
                break;
            };
            let (Some(row), Some(name)) = (rows[i].take(), names[j].take()) else {
                break;
            };
            info!(
                "Row {}: '{}' recovered as '{}' (distance {})",
                row.row, row.raw, name, distance
            );
            recovered.push(Recovery {
                row: row.row,
                raw: row.raw,
                name,
                distance,
            });
        }

        let unresolved: Vec<UnmatchedRow> = rows.into_iter().flatten().collect();
        for row in &unresolved {
            warn!("Row {}: '{}' left unresolved (no candidates left)", row.row, row.raw);
        }
        let leftover: Vec<String> = names.into_iter().flatten().collect();
        if !leftover.is_empty() {
            warn!("{} candidate(s) never matched a row: {:?}", leftover.len(), leftover);
        }

        Reconciliation {
            first_pass_matches: self.first_pass_matches,
            recovered,
            unresolved,
            leftover,
        }
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_DISTANCE)
    }
}
