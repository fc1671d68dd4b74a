use anyhow::{bail, Result};
use sb_data::UNKNOWN;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One scoreboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(rename = "player", alias = "name")]
    pub name: String,
    pub champion: String,
    pub credits: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub damage: u32,
    pub taken: u32,
    pub objective_time: u32,
    pub shielding: u32,
    pub healing: u32,
}

impl PlayerRecord {
    /// A row with only a name: champion unknown, every stat zero.
    /// Also used for candidates that never matched any recognized row.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            champion: UNKNOWN.to_string(),
            credits: 0,
            kills: 0,
            deaths: 0,
            assists: 0,
            damage: 0,
            taken: 0,
            objective_time: 0,
            shielding: 0,
            healing: 0,
        }
    }
}

/// Match summary block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInfo {
    pub time_minutes: u32,
    pub region: String,
    pub map: String,
    pub team1_score: u32,
    pub team2_score: u32,
    pub match_id: Option<u64>,
    /// Team 1 won (strictly higher score)
    pub won: bool,
}

impl MatchInfo {
    pub fn new(
        time_minutes: u32,
        region: impl Into<String>,
        map: impl Into<String>,
        team1_score: u32,
        team2_score: u32,
        match_id: Option<u64>,
    ) -> Self {
        Self {
            time_minutes,
            region: region.into(),
            map: map.into(),
            team1_score,
            team2_score,
            match_id,
            won: team1_score > team2_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    pub team1: Vec<PlayerRecord>,
    pub team2: Vec<PlayerRecord>,
}

/// Everything read from one scoreboard screenshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardRecord {
    #[serde(rename = "match")]
    pub match_info: MatchInfo,
    pub teams: Teams,
    /// Known candidates that no row could be reconciled with
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unplaced: Vec<PlayerRecord>,
}

impl ScoreboardRecord {
    /// Team 1 rows then team 2 rows, then unplaced candidates
    pub fn players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.teams
            .team1
            .iter()
            .chain(self.teams.team2.iter())
            .chain(self.unplaced.iter())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Splits the ordered rows into the two teams and attaches match metadata.
pub struct MatchAssembler {
    rows_per_team: usize,
}

impl MatchAssembler {
    pub fn new(rows_per_team: usize) -> Self {
        Self { rows_per_team }
    }

    /// First `rows_per_team` rows go to team 1, the rest to team 2, in anchor order.
    pub fn assemble(
        &self,
        rows: Vec<PlayerRecord>,
        match_info: MatchInfo,
        unplaced: Vec<PlayerRecord>,
    ) -> Result<ScoreboardRecord> {
        if rows.len() != self.rows_per_team * 2 {
            bail!(
                "expected {} player rows, got {}",
                self.rows_per_team * 2,
                rows.len()
            );
        }

        let mut team1 = rows;
        let team2 = team1.split_off(self.rows_per_team);
        debug!(
            "Assembled {} + {} rows, {} unplaced candidate(s)",
            team1.len(),
            team2.len(),
            unplaced.len()
        );

        Ok(ScoreboardRecord {
            match_info,
            teams: Teams { team1, team2 },
            unplaced,
        })
    }
}
