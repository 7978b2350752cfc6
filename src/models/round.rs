//! Round: matches generated together.

use crate::models::game::{GameMatch, MatchId};
use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based.
    pub number: u32,
    pub name: String,
    pub matches: Vec<GameMatch>,
}

impl Round {
    pub fn new(number: u32, matches: Vec<GameMatch>) -> Self {
        Self {
            number,
            name: format!("Round {number}"),
            matches,
        }
    }

    /// All matches are Completed or Walkover.
    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(GameMatch::is_terminal)
    }

    pub fn contains_player(&self, player: PlayerId) -> bool {
        self.matches.iter().any(|m| m.involves(player))
    }

    pub fn match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Players with a bye in this round.
    pub fn byes(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.matches.iter().filter(|m| m.is_bye()).map(|m| m.home)
    }
}

/// Outcome of round generation for one slot: a match or a bye.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pairing {
    Match { home: PlayerId, away: PlayerId },
    Bye(PlayerId),
}

impl Pairing {
    pub fn involves(&self, player: PlayerId) -> bool {
        match *self {
            Pairing::Match { home, away } => home == player || away == player,
            Pairing::Bye(p) => p == player,
        }
    }
}
