//! Group: a set of players and the rounds they play under one format.

use crate::config::GroupFormat;
use crate::logic::round_count;
use crate::models::game::{GameMatch, MatchId};
use crate::models::player::PlayerId;
use crate::models::round::Round;
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub format: GroupFormat,
    /// Members in seed order. The group references players; the tournament owns them.
    pub players: Vec<PlayerId>,
    pub rounds: Vec<Round>,
}

impl Group {
    pub fn new(name: impl Into<String>, format: GroupFormat, players: Vec<PlayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            players,
            rounds: Vec::new(),
        }
    }

    /// Rounds this group plays in total.
    pub fn planned_rounds(&self) -> usize {
        match self.format {
            GroupFormat::Swiss { rounds } => rounds as usize,
            GroupFormat::RoundRobin => round_count(self.players.len()),
        }
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// The latest round is complete (true before the first round).
    pub fn current_round_complete(&self) -> bool {
        self.rounds.last().map_or(true, Round::is_complete)
    }

    /// All planned rounds are generated and played.
    pub fn is_finished(&self) -> bool {
        self.rounds.len() >= self.planned_rounds() && self.current_round_complete()
    }

    pub fn matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    pub fn match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.rounds.iter_mut().find_map(|r| r.match_mut(id))
    }

    pub fn contains_player(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    /// Unordered pairs that already have a match in this group.
    pub fn played_pairs(&self) -> HashSet<(PlayerId, PlayerId)> {
        self.matches()
            .filter_map(|m| m.away.map(|away| ordered_pair(m.home, away)))
            .collect()
    }

    pub fn have_met(&self, a: PlayerId, b: PlayerId) -> bool {
        self.matches()
            .any(|m| m.away.is_some() && m.involves(a) && m.involves(b))
    }

    /// Append a freshly generated round.
    ///
    /// The round is checked as a whole before it is stored: the previous round must be
    /// complete, every player must belong to the group and appear at most once, and no
    /// pair may repeat an earlier match.
    pub fn push_round(&mut self, round: Round) -> Result<(), TournamentError> {
        if !self.current_round_complete() {
            return Err(TournamentError::IncompleteRound);
        }
        let played = self.played_pairs();
        let mut seen = HashSet::new();
        for m in &round.matches {
            for p in m.players() {
                if !self.contains_player(p) {
                    return Err(TournamentError::PlayerNotFound(p));
                }
                if !seen.insert(p) {
                    return Err(TournamentError::PlayerScheduledTwice(p));
                }
            }
            if let Some(away) = m.away {
                if played.contains(&ordered_pair(m.home, away)) {
                    return Err(TournamentError::DuplicateMatch(m.home, away));
                }
            }
        }
        self.rounds.push(round);
        Ok(())
    }
}

pub(crate) fn ordered_pair(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
