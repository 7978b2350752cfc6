//! Player data structure.

use crate::models::game::MatchId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// A registered player. Standing fields (points, Buchholz) are not stored here;
/// they are always recomputed from match history by the standings calculator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Seeding score (club rating or similar); higher is stronger.
    pub score: u32,
    pub club: Option<String>,
    /// 1-based registration order within the tournament.
    pub start_number: u32,
    /// Matches this player took part in that reached a terminal state, oldest first.
    pub history: Vec<MatchId>,
}

impl Player {
    /// Create a new player with the given name and seeding score.
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            score,
            club: None,
            start_number: 0,
            history: Vec::new(),
        }
    }

    pub fn with_club(mut self, club: impl Into<String>) -> Self {
        self.club = Some(club.into());
        self
    }

    /// Append a finished match to the history (ignored if already present).
    pub fn record_match(&mut self, match_id: MatchId) {
        if !self.history.contains(&match_id) {
            self.history.push(match_id);
        }
    }
}
