//! Match (game), set scores and match status for one-versus-one table tennis.

use crate::config::ScoringRules;
use crate::models::player::PlayerId;
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Result of one set: rally points for the home and the away player.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub home: u32,
    pub away: u32,
}

impl SetScore {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Check the set against the winning threshold and margin.
    ///
    /// A set ends as soon as one side has `points_to_win` with a lead of at least
    /// `min_margin`, so a set that went past the threshold (deuce) must end with a
    /// lead of exactly `min_margin`: 11:9 and 13:11 are valid, 12:9 and 14:10 are not.
    /// With a margin of 1 no set goes past the threshold.
    pub fn validate(&self, rules: &ScoringRules) -> Result<(), TournamentError> {
        let invalid = TournamentError::InvalidSetScore {
            home: self.home,
            away: self.away,
        };
        let (high, low) = if self.home > self.away {
            (self.home, self.away)
        } else {
            (self.away, self.home)
        };
        if high == low || high < rules.points_to_win_set {
            return Err(invalid);
        }
        let lead = high - low;
        if lead < rules.min_margin {
            return Err(invalid);
        }
        if high > rules.points_to_win_set && (rules.min_margin < 2 || lead != rules.min_margin) {
            return Err(invalid);
        }
        Ok(())
    }

    /// Read a set from `"11:9"` or from the loser's points signed by the winner:
    /// `"+9"` (or plain `"9"`) is a home win, `"-9"` an away win. The winner is
    /// given the threshold, or `min_margin` clear of the loser once past deuce.
    ///
    /// Only the notation is checked here; [`SetScore::validate`] checks the score.
    pub fn parse(notation: &str, rules: &ScoringRules) -> Result<Self, TournamentError> {
        let invalid = || TournamentError::InvalidSetNotation(notation.to_string());
        let number = |digits: &str| -> Result<u32, TournamentError> {
            let digits = digits.trim();
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            digits.parse().map_err(|_| invalid())
        };

        let text = notation.trim();
        if let Some((home, away)) = text.split_once(':') {
            return Ok(Self::new(number(home)?, number(away)?));
        }
        let (home_won, loser) = match text.strip_prefix('-') {
            Some(rest) => (false, number(rest)?),
            None => (true, number(text.strip_prefix('+').unwrap_or(text))?),
        };
        let winner = rules.points_to_win_set.max(loser.saturating_add(rules.min_margin));
        Ok(if home_won {
            Self::new(winner, loser)
        } else {
            Self::new(loser, winner)
        })
    }

    /// True if the home player took this set.
    pub fn home_won(&self) -> bool {
        self.home > self.away
    }
}

/// Parses with the default 11-point rules; see [`SetScore::parse`].
impl FromStr for SetScore {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, &ScoringRules::default())
    }
}

/// Lifecycle of a match. Completed and Walkover are terminal.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    /// Decided without play: a bye or a withdrawal.
    Walkover,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Walkover)
    }
}

/// A single match between two players, or one player and a bye (`away == None`).
///
/// Status, sets and winner can only change through [`GameMatch::record_sets`] and
/// [`GameMatch::record_walkover`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub home: PlayerId,
    /// None for a bye.
    pub away: Option<PlayerId>,
    /// Round number this match was generated in (1-based).
    pub round: u32,
    /// Whether a walkover or bye awards standings points to the advancing player.
    pub scored: bool,
    sets: Vec<SetScore>,
    status: MatchStatus,
    winner: Option<PlayerId>,
}

impl GameMatch {
    pub fn new(home: PlayerId, away: PlayerId, round: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            home,
            away: Some(away),
            round,
            scored: true,
            sets: Vec::new(),
            status: MatchStatus::Scheduled,
            winner: None,
        }
    }

    /// A bye: decided on creation, `player` advances.
    pub fn bye(player: PlayerId, round: u32, scored: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            home: player,
            away: None,
            round,
            scored,
            sets: Vec::new(),
            status: MatchStatus::Walkover,
            winner: Some(player),
        }
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn sets(&self) -> &[SetScore] {
        &self.sets
    }

    /// Winner, once the match is terminal.
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Loser, once a two-player match is terminal.
    pub fn loser(&self) -> Option<PlayerId> {
        let winner = self.winner?;
        let away = self.away?;
        Some(if winner == self.home { away } else { self.home })
    }

    pub fn is_bye(&self) -> bool {
        self.away.is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.home == player || self.away == Some(player)
    }

    /// The other player, if `player` is in this match and it is not a bye.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        let away = self.away?;
        if self.home == player {
            Some(away)
        } else if away == player {
            Some(self.home)
        } else {
            None
        }
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        std::iter::once(self.home).chain(self.away)
    }

    /// Sets won by (home, away).
    pub fn set_tally(&self) -> (u32, u32) {
        tally(&self.sets)
    }

    /// Record the full sequence of sets played so far.
    ///
    /// The sequence replaces what was recorded before while the match is open. When
    /// one side reaches `sets_to_win` the match becomes Completed; otherwise it is
    /// InProgress. Every set is validated before anything changes. Recording the
    /// identical sequence again on a Completed match is a no-op.
    ///
    /// Returns `true` if this call finished the match.
    pub fn record_sets(
        &mut self,
        sets: &[SetScore],
        rules: &ScoringRules,
    ) -> Result<bool, TournamentError> {
        match self.status {
            MatchStatus::Completed if self.sets == sets => return Ok(false),
            MatchStatus::Completed | MatchStatus::Walkover => {
                return Err(TournamentError::MatchAlreadyDecided(self.id));
            }
            MatchStatus::Scheduled | MatchStatus::InProgress => {}
        }
        if sets.is_empty() {
            return Ok(false);
        }

        let mut home_sets = 0;
        let mut away_sets = 0;
        for (i, set) in sets.iter().enumerate() {
            set.validate(rules)?;
            if home_sets == rules.sets_to_win || away_sets == rules.sets_to_win {
                return Err(TournamentError::TooManySets {
                    sets_to_win: rules.sets_to_win,
                    recorded: i + 1,
                });
            }
            if set.home_won() {
                home_sets += 1;
            } else {
                away_sets += 1;
            }
        }

        self.sets = sets.to_vec();
        if home_sets == rules.sets_to_win {
            self.status = MatchStatus::Completed;
            self.winner = Some(self.home);
        } else if away_sets == rules.sets_to_win {
            self.status = MatchStatus::Completed;
            self.winner = self.away;
        } else {
            self.status = MatchStatus::InProgress;
        }
        Ok(self.status == MatchStatus::Completed)
    }

    /// Decide an open match without (further) play, e.g. after a withdrawal.
    pub fn record_walkover(&mut self, winner: PlayerId) -> Result<(), TournamentError> {
        if self.is_terminal() {
            return Err(TournamentError::MatchAlreadyDecided(self.id));
        }
        if self.away.is_none() || !self.involves(winner) {
            return Err(TournamentError::PlayerNotFound(winner));
        }
        self.status = MatchStatus::Walkover;
        self.winner = Some(winner);
        Ok(())
    }
}

fn tally(sets: &[SetScore]) -> (u32, u32) {
    sets.iter().fold((0, 0), |(h, a), s| {
        if s.home_won() {
            (h + 1, a)
        } else {
            (h, a + 1)
        }
    })
}
