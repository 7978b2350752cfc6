//! Tournament, TournamentState and TournamentError.

use crate::config::TournamentConfig;
use crate::models::bracket::Bracket;
use crate::models::game::{GameMatch, MatchId, SetScore};
use crate::models::group::{Group, GroupId};
use crate::models::player::{Player, PlayerId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// A set score breaks the winning threshold / margin rule.
    #[error("invalid set score {home}:{away}")]
    InvalidSetScore { home: u32, away: u32 },
    /// Set notation that is neither `home:away` nor a signed loser score like `+9`.
    #[error("cannot read set score {0:?}")]
    InvalidSetNotation(String),
    /// More sets were recorded than the match can last.
    #[error("match is decided after {sets_to_win} won sets, got {recorded} sets")]
    TooManySets { sets_to_win: u32, recorded: usize },
    /// A pairing would repeat an earlier match of the same group.
    #[error("players {0} and {1} have already played each other")]
    DuplicateMatch(PlayerId, PlayerId),
    /// A player appears in more than one match of a round.
    #[error("player {0} is scheduled twice in one round")]
    PlayerScheduledTwice(PlayerId),
    /// The Swiss engine found no legal round.
    #[error("no legal pairing exists for the next round of {group}")]
    UnpairableRound { group: String },
    /// Not all matches of the current round are Completed.
    #[error("not all matches of the current round are finished")]
    IncompleteRound,
    #[error("need at least {required} players, got {available}")]
    InsufficientPlayers { required: usize, available: usize },
    /// More entrants than one qualification round can bring down to the main draw.
    #[error("{entrants} entrants do not fit a main draw of {size} with one qualification round")]
    BracketTooSmall { entrants: usize, size: usize },
    /// Tournament is not in a state that allows this action.
    #[error("invalid state for this action")]
    InvalidState,
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    /// A player with this name already exists (names are unique, case-insensitive).
    #[error("a player with this name already exists")]
    DuplicatePlayerName,
    #[error("player name must not be empty")]
    EmptyPlayerName,
    /// The match is Completed or a Walkover and cannot take a different result.
    #[error("match {0} is already decided")]
    MatchAlreadyDecided(MatchId),
    /// All rounds of the group have been generated.
    #[error("{0} has played all its rounds")]
    GroupFinished(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Adding and removing players; nothing scheduled yet.
    #[default]
    Registration,
    /// Groups are playing their rounds.
    GroupStage,
    /// The single-elimination bracket is being played.
    Knockout,
    /// The final is decided.
    Completed,
}

/// Full tournament: roster, groups, bracket and phase. The roster is owned here;
/// groups and bracket only hold player ids.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub date: NaiveDate,
    pub config: TournamentConfig,
    pub players: Vec<Player>,
    pub groups: Vec<Group>,
    pub bracket: Option<Bracket>,
    pub state: TournamentState,
}

impl Tournament {
    /// Create a new tournament in Registration state with no players.
    pub fn new(
        name: impl Into<String>,
        date: NaiveDate,
        config: TournamentConfig,
    ) -> Result<Self, TournamentError> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            config,
            players: Vec::new(),
            groups: Vec::new(),
            bracket: None,
            state: TournamentState::Registration,
        })
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Register a player (Registration only). Names must be unique (case-insensitive).
    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        score: u32,
    ) -> Result<PlayerId, TournamentError> {
        self.add_registered(Player::new(name, score))
    }

    /// Register a fully built player record (e.g. from a roster import).
    pub fn add_registered(&mut self, mut player: Player) -> Result<PlayerId, TournamentError> {
        if self.state != TournamentState::Registration {
            return Err(TournamentError::InvalidState);
        }
        let name = player.name.trim().to_string();
        if name.is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        if self.players.iter().any(|p| p.name.eq_ignore_ascii_case(&name)) {
            return Err(TournamentError::DuplicatePlayerName);
        }
        player.name = name;
        player.start_number = self.players.len() as u32 + 1;
        player.history.clear();
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Remove a player by id (Registration only). Start numbers are renumbered.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), TournamentError> {
        if self.state != TournamentState::Registration {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        self.players.remove(idx);
        for (i, p) in self.players.iter_mut().enumerate() {
            p.start_number = i as u32 + 1;
        }
        Ok(())
    }

    /// Every match of the tournament: group matches first, then the bracket.
    pub fn matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.groups
            .iter()
            .flat_map(Group::matches)
            .chain(self.bracket.iter().flat_map(Bracket::matches))
    }

    pub fn find_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches().find(|m| m.id == id)
    }

    fn match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        if let Some(m) = self.groups.iter_mut().find_map(|g| g.match_mut(id)) {
            return Some(m);
        }
        self.bracket.as_mut().and_then(|b| b.match_mut(id))
    }

    /// Record the sets played so far in a match. The match decides its own status and
    /// winner; recording the same finished result twice changes nothing.
    pub fn record_set_result(
        &mut self,
        match_id: MatchId,
        sets: &[SetScore],
    ) -> Result<(), TournamentError> {
        // every match is decided once Completed, so only an unchanged result gets through
        if !matches!(
            self.state,
            TournamentState::GroupStage | TournamentState::Knockout | TournamentState::Completed
        ) {
            return Err(TournamentError::InvalidState);
        }
        let rules = self.config.scoring.clone();
        let game = self
            .match_mut(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if game.record_sets(sets, &rules)? {
            log::info!(
                "Match {} completed ({}:{} in sets)",
                match_id,
                game.set_tally().0,
                game.set_tally().1
            );
            self.sync_history();
        }
        Ok(())
    }

    /// Decide an open match without play (withdrawal). The winner gets the points of a win.
    pub fn record_walkover(
        &mut self,
        match_id: MatchId,
        winner: PlayerId,
    ) -> Result<(), TournamentError> {
        if !matches!(
            self.state,
            TournamentState::GroupStage | TournamentState::Knockout
        ) {
            return Err(TournamentError::InvalidState);
        }
        self.match_mut(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?
            .record_walkover(winner)?;
        log::info!("Match {} decided by walkover for {}", match_id, winner);
        self.sync_history();
        Ok(())
    }

    /// Append every decided match to its players' histories (idempotent).
    pub(crate) fn sync_history(&mut self) {
        let finished: Vec<(MatchId, Vec<PlayerId>)> = self
            .matches()
            .filter(|m| m.is_terminal())
            .map(|m| (m.id, m.players().collect()))
            .collect();
        for (match_id, players) in finished {
            for pid in players {
                if let Some(p) = self.player_mut(pid) {
                    p.record_match(match_id);
                }
            }
        }
    }
}
