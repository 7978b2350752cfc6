//! Single-elimination bracket: a binary tree of matches stored round by round.
//!
//! Node `i` of round `r + 1` is fed by nodes `2i` and `2i + 1` of round `r`; the last
//! round holds a single node, the final.

use crate::models::game::{GameMatch, MatchId};
use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Where one side of a bracket node gets its player from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// A seeded entrant (seed is 1-based).
    Seed { seed: usize, player: PlayerId },
    /// Empty seed position; the opponent advances without playing.
    Bye,
    /// Winner of the given qualification match.
    QualificationWinner(usize),
    /// Winner of the given node in the previous round.
    WinnerOf(usize),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketNode {
    pub top: Slot,
    pub bottom: Slot,
    /// Created once both sides are known.
    pub game: Option<GameMatch>,
}

impl BracketNode {
    pub fn new(top: Slot, bottom: Slot) -> Self {
        Self {
            top,
            bottom,
            game: None,
        }
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.game.as_ref().and_then(GameMatch::winner)
    }

    pub fn is_decided(&self) -> bool {
        self.game.as_ref().is_some_and(GameMatch::is_terminal)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketRound {
    pub name: String,
    pub nodes: Vec<BracketNode>,
}

/// Which part of the bracket is currently being played.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "round")]
pub enum BracketProgress {
    Qualification,
    /// Index into `Bracket::rounds`.
    Round(usize),
    Finished,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Main draw size, a power of two.
    pub size: usize,
    /// Entrants in seed order (seed 1 first), including those sent to qualification.
    pub seeds: Vec<PlayerId>,
    /// Preliminary matches among the lowest seeds; empty when not needed.
    pub qualification: Vec<GameMatch>,
    /// Main draw rounds, first round first, final last.
    pub rounds: Vec<BracketRound>,
    pub progress: BracketProgress,
}

impl Bracket {
    /// Number of main draw rounds: log2(size).
    pub fn depth(&self) -> usize {
        self.rounds.len()
    }

    /// Bye slots in the first main draw round.
    pub fn byes(&self) -> usize {
        self.rounds.first().map_or(0, |r| {
            r.nodes
                .iter()
                .flat_map(|n| [n.top, n.bottom])
                .filter(|s| *s == Slot::Bye)
                .count()
        })
    }

    /// Winner of the final, once it is decided.
    pub fn champion(&self) -> Option<PlayerId> {
        self.rounds.last()?.nodes.first()?.winner()
    }

    pub fn is_finished(&self) -> bool {
        self.progress == BracketProgress::Finished
    }

    /// Display name of the stage currently being played.
    pub fn stage_name(&self) -> &str {
        match self.progress {
            BracketProgress::Qualification => "Qualification",
            BracketProgress::Round(r) => &self.rounds[r].name,
            BracketProgress::Finished => "Finished",
        }
    }

    /// Matches of the stage currently being played.
    pub fn current_matches(&self) -> Vec<&GameMatch> {
        match self.progress {
            BracketProgress::Qualification => self.qualification.iter().collect(),
            BracketProgress::Round(r) => self.rounds[r]
                .nodes
                .iter()
                .filter_map(|n| n.game.as_ref())
                .collect(),
            BracketProgress::Finished => Vec::new(),
        }
    }

    pub fn matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.qualification.iter().chain(
            self.rounds
                .iter()
                .flat_map(|r| r.nodes.iter().filter_map(|n| n.game.as_ref())),
        )
    }

    pub fn match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.qualification
            .iter_mut()
            .chain(
                self.rounds
                    .iter_mut()
                    .flat_map(|r| r.nodes.iter_mut().filter_map(|n| n.game.as_mut())),
            )
            .find(|m| m.id == id)
    }
}
