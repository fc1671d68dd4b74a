//! Scoreboard region template.
//!
//! Player columns are stored relative to the top of their row (the row
//! anchor); match-level boxes are stored in absolute screenshot coordinates.
//! Both groups get their own global [`Shift`]. Defaults are calibrated on the
//! 2560x1440 end-of-match scoreboard.

use super::{Rect, Shift};
use serde::{Deserialize, Serialize};

/// Per-row fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerField {
    Icon,
    Player,
    Credits,
    Kda,
    Damage,
    Taken,
    ObjectiveTime,
    Shielding,
    Healing,
}

impl PlayerField {
    /// Text columns in the order they are read for a row.
    pub const TEXT_COLUMNS: [PlayerField; 8] = [
        PlayerField::Player,
        PlayerField::Credits,
        PlayerField::Kda,
        PlayerField::Damage,
        PlayerField::Taken,
        PlayerField::ObjectiveTime,
        PlayerField::Shielding,
        PlayerField::Healing,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PlayerField::Icon => "icon",
            PlayerField::Player => "player",
            PlayerField::Credits => "credits",
            PlayerField::Kda => "kda",
            PlayerField::Damage => "damage",
            PlayerField::Taken => "taken",
            PlayerField::ObjectiveTime => "objective_time",
            PlayerField::Shielding => "shielding",
            PlayerField::Healing => "healing",
        }
    }
}

/// Match-level fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchField {
    Duration,
    Region,
    Map,
    Team1Score,
    Team2Score,
}

impl MatchField {
    pub const ALL: [MatchField; 5] = [
        MatchField::Duration,
        MatchField::Region,
        MatchField::Map,
        MatchField::Team1Score,
        MatchField::Team2Score,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MatchField::Duration => "duration",
            MatchField::Region => "region",
            MatchField::Map => "map",
            MatchField::Team1Score => "team1_score",
            MatchField::Team2Score => "team2_score",
        }
    }
}

/// Player column boxes, relative to the row anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTemplate {
    /// Champion portrait. Sits a few pixels above the row text and is not
    /// affected by the player shift.
    pub icon: Rect,
    pub player: Rect,
    pub credits: Rect,
    pub kda: Rect,
    pub damage: Rect,
    pub taken: Rect,
    pub objective_time: Rect,
    pub shielding: Rect,
    pub healing: Rect,
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self {
            icon: Rect::new(4, -4, 232, 97),
            player: Rect::new(140, 0, 460, 62),
            credits: Rect::new(620, 0, 790, 100),
            kda: Rect::new(795, 0, 1010, 100),
            damage: Rect::new(1020, 0, 1260, 100),
            taken: Rect::new(1270, 0, 1500, 100),
            objective_time: Rect::new(1510, 0, 1650, 100),
            shielding: Rect::new(1660, 0, 1910, 100),
            healing: Rect::new(1920, 0, 2140, 100),
        }
    }
}

/// Match summary boxes, absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTemplate {
    pub duration: Rect,
    pub region: Rect,
    pub map: Rect,
    pub team1_score: Rect,
    pub team2_score: Rect,
}

impl Default for MatchTemplate {
    fn default() -> Self {
        Self {
            duration: Rect::new(150, 720, 400, 770),
            region: Rect::new(150, 770, 480, 820),
            map: Rect::new(150, 820, 650, 880),
            team1_score: Rect::new(1050, 670, 1090, 730),
            team2_score: Rect::new(1050, 830, 1090, 880),
        }
    }
}

/// Field key -> rectangle template for the whole scoreboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionMap {
    pub player: PlayerTemplate,
    #[serde(rename = "match")]
    pub match_info: MatchTemplate,
}

impl RegionMap {
    /// Template rectangle of a player column, relative to its row.
    pub fn template(&self, field: PlayerField) -> Rect {
        let t = &self.player;
        match field {
            PlayerField::Icon => t.icon,
            PlayerField::Player => t.player,
            PlayerField::Credits => t.credits,
            PlayerField::Kda => t.kda,
            PlayerField::Damage => t.damage,
            PlayerField::Taken => t.taken,
            PlayerField::ObjectiveTime => t.objective_time,
            PlayerField::Shielding => t.shielding,
            PlayerField::Healing => t.healing,
        }
    }

    /// Absolute rectangle of a player column for the row starting at `anchor_y`.
    pub fn absolute_rect(&self, field: PlayerField, anchor_y: i32, shift: Shift) -> Rect {
        self.template(field).offset(shift.x, anchor_y + shift.y)
    }

    /// Absolute rectangle of a match-level box.
    pub fn match_rect(&self, field: MatchField, shift: Shift) -> Rect {
        let t = &self.match_info;
        let rect = match field {
            MatchField::Duration => t.duration,
            MatchField::Region => t.region,
            MatchField::Map => t.map,
            MatchField::Team1Score => t.team1_score,
            MatchField::Team2Score => t.team2_score,
        };
        rect.offset(shift.x, shift.y)
    }
}
