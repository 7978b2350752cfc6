//! Data structures for the tournament: players, matches, rounds, groups, bracket.

mod bracket;
mod game;
mod group;
mod player;
mod round;
mod tournament;

pub use bracket::{Bracket, BracketNode, BracketProgress, BracketRound, Slot};
pub use game::{GameMatch, MatchId, MatchStatus, SetScore};
pub(crate) use group::ordered_pair;
pub use group::{Group, GroupId};
pub use player::{Player, PlayerId};
pub use round::{Pairing, Round};
pub use tournament::{Tournament, TournamentError, TournamentId, TournamentState};
