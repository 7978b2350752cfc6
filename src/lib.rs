//! Table tennis tournament organizer: library with models, scheduling logic and
//! roster import.

pub mod config;
pub mod logic;
pub mod models;
pub mod roster;

pub use config::{
    BracketConfig, ByePolicy, GroupConfig, GroupFormat, ScoringRules, TournamentConfig,
};
pub use logic::{
    advance_knockout, champion, generate_group_round, generate_next_rounds, simulate_round,
    standings, start_group_stage, start_knockout, Standing,
};
pub use models::{
    Bracket, BracketProgress, GameMatch, Group, GroupId, MatchId, MatchStatus, Player, PlayerId,
    Round, SetScore, Tournament, TournamentError, TournamentId, TournamentState,
};
pub use roster::{import_roster, read_roster, RosterError};
