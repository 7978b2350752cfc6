//! Random results for open matches, weighted by seeding score. Used for demos and
//! dry runs of a tournament plan.

use crate::config::ScoringRules;
use crate::models::{MatchId, Player, SetScore, Tournament, TournamentError, TournamentState};
use rand::Rng;

/// Play one set rally by rally. The stronger player wins each rally with probability
/// `0.5 + (home_score - away_score) / 10000`, kept within 5..95%.
pub fn simulate_set<R: Rng + ?Sized>(
    rng: &mut R,
    home_score: u32,
    away_score: u32,
    rules: &ScoringRules,
) -> SetScore {
    let diff = f64::from(home_score) - f64::from(away_score);
    let p_home = (0.5 + diff / 10_000.0).clamp(0.05, 0.95);
    let (mut home, mut away) = (0, 0);
    loop {
        if rng.gen_bool(p_home) {
            home += 1;
        } else {
            away += 1;
        }
        let (high, low) = (home.max(away), home.min(away));
        if high >= rules.points_to_win_set && high - low >= rules.min_margin {
            return SetScore::new(home, away);
        }
    }
}

/// Sets of one simulated match, stopping as soon as a player has `sets_to_win`.
pub fn simulate_match<R: Rng + ?Sized>(
    rng: &mut R,
    home: &Player,
    away: &Player,
    rules: &ScoringRules,
) -> Vec<SetScore> {
    let mut sets = Vec::new();
    let (mut home_sets, mut away_sets) = (0, 0);
    while home_sets < rules.sets_to_win && away_sets < rules.sets_to_win {
        let set = simulate_set(rng, home.score, away.score, rules);
        if set.home_won() {
            home_sets += 1;
        } else {
            away_sets += 1;
        }
        sets.push(set);
    }
    sets
}

/// Simulate every open match of the stage currently being played: the latest round of
/// each group, or the current bracket round. Results go through
/// [`Tournament::record_set_result`] like any other. Returns the number of matches played.
pub fn simulate_round<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<usize, TournamentError> {
    let open: Vec<(MatchId, Vec<SetScore>)> = {
        let games: Vec<_> = match tournament.state {
            TournamentState::GroupStage => tournament
                .groups
                .iter()
                .filter_map(|g| g.current_round())
                .flat_map(|r| r.matches.iter())
                .collect(),
            TournamentState::Knockout => tournament
                .bracket
                .as_ref()
                .map(|b| b.current_matches())
                .unwrap_or_default(),
            _ => return Err(TournamentError::InvalidState),
        };
        let mut open = Vec::new();
        for game in games.into_iter().filter(|m| !m.is_terminal()) {
            let Some(away) = game.away else { continue };
            let home = tournament
                .player(game.home)
                .ok_or(TournamentError::PlayerNotFound(game.home))?;
            let away = tournament
                .player(away)
                .ok_or(TournamentError::PlayerNotFound(away))?;
            let sets = simulate_match(rng, home, away, &tournament.config.scoring);
            open.push((game.id, sets));
        }
        open
    };

    for (match_id, sets) in &open {
        tournament.record_set_result(*match_id, sets)?;
    }
    log::info!("{}: simulated {} matches", tournament.name, open.len());
    Ok(open.len())
}
