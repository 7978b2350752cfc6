//! Group stage: splitting the roster into groups, round generation and qualifiers.

use crate::config::{ByePolicy, GroupConfig, GroupFormat, ScoringRules, TournamentConfig};
use crate::logic::round_robin::berger_schedule;
use crate::logic::standings::{compare, compute_standings, Standing};
use crate::logic::swiss::pair_swiss_round;
use crate::models::{
    GameMatch, Group, GroupId, Pairing, Player, PlayerId, Round, Tournament, TournamentError,
    TournamentState,
};

/// Split the roster into balanced groups.
///
/// Players are ordered by seeding score (registration order on ties) and dealt out in a
/// serpentine: A B C, C B A, A B C, ... The number of groups is
/// `max(1, players / players_per_group)`, so groups may be larger than configured but
/// never smaller.
pub fn create_groups(
    players: &[Player],
    config: &GroupConfig,
) -> Result<Vec<Group>, TournamentError> {
    if players.len() < 2 {
        return Err(TournamentError::InsufficientPlayers {
            required: 2,
            available: players.len(),
        });
    }
    let count = (players.len() / config.players_per_group.max(2)).max(1);

    let mut seeded: Vec<&Player> = players.iter().collect();
    seeded.sort_by(|a, b| b.score.cmp(&a.score));

    let mut members: Vec<Vec<PlayerId>> = vec![Vec::new(); count];
    for (i, p) in seeded.iter().enumerate() {
        let (row, col) = (i / count, i % count);
        let idx = if row % 2 == 0 { col } else { count - 1 - col };
        members[idx].push(p.id);
    }

    Ok(members
        .into_iter()
        .enumerate()
        .map(|(i, ids)| Group::new(group_name(i), config.format, ids))
        .collect())
}

fn group_name(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => format!("Group {}", char::from(b'A' + i)),
        _ => format!("Group {}", index + 1),
    }
}

/// Members of `group` as player records, in group (seed) order.
fn members<'a>(group: &Group, players: &'a [Player]) -> Result<Vec<&'a Player>, TournamentError> {
    group
        .players
        .iter()
        .map(|&id| {
            players
                .iter()
                .find(|p| p.id == id)
                .ok_or(TournamentError::PlayerNotFound(id))
        })
        .collect()
}

/// Standings of one group over its own matches.
pub fn group_standings(
    group: &Group,
    players: &[Player],
    rules: &ScoringRules,
) -> Result<Vec<Standing>, TournamentError> {
    Ok(compute_standings(members(group, players)?, group.matches(), rules))
}

/// Generate the group's next round.
///
/// Round robin takes the next round of the Berger table; Swiss asks the pairing engine.
/// The previous round must be complete and the round budget not yet used up. The round
/// is validated and stored as a whole or not at all.
pub fn generate_round<'g>(
    group: &'g mut Group,
    players: &[Player],
    config: &TournamentConfig,
) -> Result<&'g Round, TournamentError> {
    if !group.current_round_complete() {
        return Err(TournamentError::IncompleteRound);
    }
    let played = group.rounds.len();
    if played >= group.planned_rounds() {
        return Err(TournamentError::GroupFinished(group.name.clone()));
    }
    let number = played as u32 + 1;

    let (pairings, bye_scored) = match group.format {
        GroupFormat::RoundRobin => {
            let pairings = berger_schedule(&group.players)
                .into_iter()
                .nth(played)
                .ok_or_else(|| TournamentError::GroupFinished(group.name.clone()))?;
            let pairings = match config.group.round_robin_bye {
                ByePolicy::Skip => pairings
                    .into_iter()
                    .filter(|p| !matches!(p, Pairing::Bye(_)))
                    .collect(),
                ByePolicy::RecordWithoutPoints => pairings,
            };
            (pairings, false)
        }
        GroupFormat::Swiss { .. } => {
            let history: Vec<&GameMatch> = group.matches().collect();
            let pairings = pair_swiss_round(
                &group.name,
                &members(group, players)?,
                &history,
                &config.scoring,
                config.group.swiss_lookahead,
            )?;
            (pairings, true)
        }
    };

    let matches = pairings
        .into_iter()
        .map(|p| match p {
            Pairing::Match { home, away } => GameMatch::new(home, away, number),
            Pairing::Bye(player) => GameMatch::bye(player, number, bye_scored),
        })
        .collect();
    group.push_round(Round::new(number, matches))?;
    log::info!(
        "{}: round {} of {} generated",
        group.name,
        number,
        group.planned_rounds()
    );
    group.rounds.last().ok_or(TournamentError::InvalidState)
}

/// Top `per_group` finishers of every group, re-ranked across groups for seeding:
/// all group winners first, then all runners-up, and so on; within one placement by
/// points, Buchholz, set and ball difference, seeding score, then group order.
pub fn select_qualifiers(
    groups: &[Group],
    players: &[Player],
    rules: &ScoringRules,
    per_group: usize,
) -> Result<Vec<PlayerId>, TournamentError> {
    if let Some(open) = groups.iter().find(|g| !g.is_finished()) {
        log::debug!("{} has not finished its rounds", open.name);
        return Err(TournamentError::IncompleteRound);
    }

    let mut qualified: Vec<(usize, Standing, u32, usize)> = Vec::new();
    for (group_index, group) in groups.iter().enumerate() {
        for (placement, standing) in group_standings(group, players, rules)?
            .into_iter()
            .take(per_group)
            .enumerate()
        {
            let score = players
                .iter()
                .find(|p| p.id == standing.player_id)
                .map_or(0, |p| p.score);
            qualified.push((placement, standing, score, group_index));
        }
    }
    if qualified.len() < 2 {
        return Err(TournamentError::InsufficientPlayers {
            required: 2,
            available: qualified.len(),
        });
    }

    qualified.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| compare(&a.1, &b.1))
            .then(b.2.cmp(&a.2))
            .then(a.3.cmp(&b.3))
    });
    Ok(qualified.into_iter().map(|q| q.1.player_id).collect())
}

/// Generate the next round of one group.
pub fn generate_group_round(
    tournament: &mut Tournament,
    group_id: GroupId,
) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::GroupStage {
        return Err(TournamentError::InvalidState);
    }
    let Tournament {
        groups,
        players,
        config,
        ..
    } = tournament;
    let group = groups
        .iter_mut()
        .find(|g| g.id == group_id)
        .ok_or(TournamentError::GroupNotFound(group_id))?;
    generate_round(group, players, config)?;
    tournament.sync_history();
    Ok(())
}

/// Generate the next round in every group that still has rounds to play. Either all
/// of those groups get their round or none does. Returns how many rounds were created.
pub fn generate_next_rounds(tournament: &mut Tournament) -> Result<usize, TournamentError> {
    if tournament.state != TournamentState::GroupStage {
        return Err(TournamentError::InvalidState);
    }
    let mut groups = tournament.groups.clone();
    let mut generated = 0;
    for group in groups
        .iter_mut()
        .filter(|g| g.rounds.len() < g.planned_rounds())
    {
        generate_round(group, &tournament.players, &tournament.config)?;
        generated += 1;
    }
    tournament.groups = groups;
    tournament.sync_history();
    Ok(generated)
}

/// Standings of one group of the tournament.
pub fn standings(
    tournament: &Tournament,
    group_id: GroupId,
) -> Result<Vec<Standing>, TournamentError> {
    let group = tournament
        .group(group_id)
        .ok_or(TournamentError::GroupNotFound(group_id))?;
    group_standings(group, &tournament.players, &tournament.config.scoring)
}
