//! Tournament configuration: scoring rules, group stage and knockout settings.
//!
//! Every field has a default so a request body may omit any part of it.

use crate::models::TournamentError;
use serde::{Deserialize, Serialize};

/// Set/match winning rules and the standings point scheme.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Rally points needed to take a set.
    pub points_to_win_set: u32,
    /// Lead required to take a set.
    pub min_margin: u32,
    /// Sets needed to take the match (3 = best of five).
    pub sets_to_win: u32,
    pub points_for_win: u32,
    pub points_for_loss: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            points_to_win_set: 11,
            min_margin: 2,
            sets_to_win: 3,
            points_for_win: 2,
            points_for_loss: 0,
        }
    }
}

/// Pairing format of a group.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GroupFormat {
    /// Swiss system over a fixed number of rounds.
    Swiss { rounds: u32 },
    /// Everyone plays everyone once (Berger table).
    #[default]
    RoundRobin,
}

/// What a round-robin bye turns into.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByePolicy {
    /// No match is generated for the idle player.
    #[default]
    Skip,
    /// An unscored walkover is recorded so the bye shows up in the round.
    RecordWithoutPoints,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    pub players_per_group: usize,
    pub format: GroupFormat,
    /// Top finishers of each group that go on to the knockout stage.
    pub qualifiers_per_group: usize,
    pub round_robin_bye: ByePolicy,
    /// How many positions below a player the Swiss engine looks for an opponent
    /// before backtracking.
    pub swiss_lookahead: usize,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            players_per_group: 4,
            format: GroupFormat::RoundRobin,
            qualifiers_per_group: 2,
            round_robin_bye: ByePolicy::Skip,
            swiss_lookahead: 3,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketConfig {
    /// Size of the main draw. With more entrants than this, the lowest seeds play a
    /// qualification round first. None: the draw grows to the next power of two.
    pub main_draw_size: Option<usize>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    pub scoring: ScoringRules,
    pub group: GroupConfig,
    pub bracket: BracketConfig,
}

impl TournamentConfig {
    pub fn validate(&self) -> Result<(), TournamentError> {
        let scoring = &self.scoring;
        if scoring.points_to_win_set == 0 || scoring.min_margin == 0 || scoring.sets_to_win == 0 {
            return Err(TournamentError::InvalidConfig(
                "set threshold, margin and sets to win must be positive".into(),
            ));
        }
        if scoring.points_for_win <= scoring.points_for_loss {
            return Err(TournamentError::InvalidConfig(
                "a win must be worth more than a loss".into(),
            ));
        }
        if self.group.players_per_group < 2 {
            return Err(TournamentError::InvalidConfig(
                "groups need at least 2 players".into(),
            ));
        }
        if self.group.qualifiers_per_group == 0 {
            return Err(TournamentError::InvalidConfig(
                "at least one player per group must qualify".into(),
            ));
        }
        if let GroupFormat::Swiss { rounds: 0 } = self.group.format {
            return Err(TournamentError::InvalidConfig(
                "a Swiss group needs at least one round".into(),
            ));
        }
        if let Some(size) = self.bracket.main_draw_size {
            if size < 2 || !size.is_power_of_two() {
                return Err(TournamentError::InvalidConfig(format!(
                    "main draw size {size} is not a power of two"
                )));
            }
        }
        Ok(())
    }
}
