//! Knockout stage: seeding the bracket from the group stage (or the roster) and
//! advancing it round by round until the final is decided.

use crate::logic::bracket::{advance_bracket, build_bracket};
use crate::logic::group_stage::select_qualifiers;
use crate::logic::standings::rank_players;
use crate::models::{BracketProgress, PlayerId, Tournament, TournamentError, TournamentState};

/// Build the bracket and enter the knockout stage.
///
/// From the group stage, every group must be finished; the qualifiers are seeded by
/// [`select_qualifiers`]. Straight from registration, the whole roster is seeded by
/// seeding score.
pub fn start_knockout(tournament: &mut Tournament) -> Result<(), TournamentError> {
    let seeds: Vec<PlayerId> = match tournament.state {
        TournamentState::GroupStage => select_qualifiers(
            &tournament.groups,
            &tournament.players,
            &tournament.config.scoring,
            tournament.config.group.qualifiers_per_group,
        )?,
        TournamentState::Registration => rank_players(
            &tournament.players,
            std::iter::empty(),
            &tournament.config.scoring,
        ),
        _ => return Err(TournamentError::InvalidState),
    };
    let bracket = build_bracket(&seeds, &tournament.config.bracket)?;
    tournament.bracket = Some(bracket);
    tournament.state = TournamentState::Knockout;
    tournament.sync_history();
    Ok(())
}

/// Open the next bracket round once the current one is decided. After the final the
/// tournament is Completed.
pub fn advance_knockout(tournament: &mut Tournament) -> Result<BracketProgress, TournamentError> {
    if tournament.state != TournamentState::Knockout {
        return Err(TournamentError::InvalidState);
    }
    let bracket = tournament
        .bracket
        .as_mut()
        .ok_or(TournamentError::InvalidState)?;
    let progress = advance_bracket(bracket)?;
    if progress == BracketProgress::Finished {
        if let Some(winner) = bracket.champion() {
            log::info!("{}: won by {}", tournament.name, winner);
        }
        tournament.state = TournamentState::Completed;
    }
    tournament.sync_history();
    Ok(progress)
}

/// Winner of the final, once decided.
pub fn champion(tournament: &Tournament) -> Option<PlayerId> {
    tournament.bracket.as_ref().and_then(|b| b.champion())
}
