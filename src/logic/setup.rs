//! Setup phase: leave Registration by opening the group stage.

use crate::logic::group_stage::create_groups;
use crate::models::{Tournament, TournamentError, TournamentState};

/// Split the roster into groups and open the group stage (Registration only).
pub fn start_group_stage(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::Registration {
        return Err(TournamentError::InvalidState);
    }
    let groups = create_groups(&tournament.players, &tournament.config.group)?;
    log::info!(
        "{}: group stage started with {} players in {} groups",
        tournament.name,
        tournament.players.len(),
        groups.len()
    );
    tournament.groups = groups;
    tournament.state = TournamentState::GroupStage;
    Ok(())
}
