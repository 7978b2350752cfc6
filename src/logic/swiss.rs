//! Swiss system pairing: one round at a time from current standings and history.

use crate::config::ScoringRules;
use crate::logic::standings::rank_players;
use crate::models::{ordered_pair, GameMatch, Pairing, Player, PlayerId, TournamentError};
use std::collections::{HashMap, HashSet};

type PlayedPairs = HashSet<(PlayerId, PlayerId)>;

/// Pair the next round of a Swiss group.
///
/// 1. Rank players by current standings; before the first round, the top half by seed
///    meets the bottom half (1 v k+1, 2 v k+2, ...).
/// 2. From the top, each player takes the nearest-ranked opponent they have not met
///    within `lookahead` places, backtracking when a later player is left stranded. If
///    the windowed search fails, the window is lifted.
/// 3. Odd fields: exactly one bye, to the player with the fewest byes so far, then the
///    least recently byed, then the lowest ranked, as long as the rest can be paired.
/// 4. Even fields: byes only when no rematch-free pairing exists, and only for
///    players who never had one.
///
/// Never produces a rematch: if nothing legal exists the result is `UnpairableRound`.
pub fn pair_swiss_round(
    group_name: &str,
    players: &[&Player],
    history: &[&GameMatch],
    rules: &ScoringRules,
    lookahead: usize,
) -> Result<Vec<Pairing>, TournamentError> {
    if players.len() < 2 {
        return Err(TournamentError::InsufficientPlayers {
            required: 2,
            available: players.len(),
        });
    }
    let lookahead = lookahead.max(1);
    let played: PlayedPairs = history
        .iter()
        .filter_map(|m| m.away.map(|away| ordered_pair(m.home, away)))
        .collect();
    let first_round = history.is_empty();
    let ranked = if first_round {
        seed_order(players)
    } else {
        rank_players(players.iter().copied(), history.iter().copied(), rules)
    };
    let arrange = |field: Vec<PlayerId>| if first_round { fold_halves(&field) } else { field };
    let unpairable = || TournamentError::UnpairableRound {
        group: group_name.to_string(),
    };

    let mut byes: HashMap<PlayerId, (u32, u32)> = HashMap::new();
    for m in history.iter().filter(|m| m.is_bye()) {
        let entry = byes.entry(m.home).or_insert((0, 0));
        entry.0 += 1;
        entry.1 = entry.1.max(m.round);
    }
    let bye_record = |p: &PlayerId| byes.get(p).copied().unwrap_or((0, 0));

    if ranked.len() % 2 == 1 {
        let mut candidates: Vec<PlayerId> = ranked.iter().rev().copied().collect();
        candidates.sort_by_key(bye_record);
        for candidate in candidates {
            let rest = arrange(ranked.iter().copied().filter(|&p| p != candidate).collect());
            if let Some(mut pairings) = pair_field(&rest, &played, lookahead) {
                log::debug!("{group_name}: bye to {candidate}");
                pairings.push(Pairing::Bye(candidate));
                return Ok(pairings);
            }
        }
        return Err(unpairable());
    }

    let ranked = arrange(ranked);
    if let Some(pairings) = pair_field(&ranked, &played, lookahead) {
        return Ok(pairings);
    }

    let eligible: HashSet<PlayerId> = ranked
        .iter()
        .copied()
        .filter(|p| bye_record(p).0 == 0)
        .collect();
    for budget in (2..=eligible.len()).step_by(2) {
        let mut remaining = ranked.clone();
        let mut out = Vec::with_capacity(ranked.len());
        if search(&mut remaining, &played, usize::MAX, budget, &eligible, &mut out) {
            log::warn!(
                "{group_name}: no rematch-free pairing, {} fallback byes",
                out.iter().filter(|p| matches!(p, Pairing::Bye(_))).count()
            );
            return Ok(out);
        }
    }
    Err(unpairable())
}

/// Seed order: seeding score descending, registration order on ties.
fn seed_order(players: &[&Player]) -> Vec<PlayerId> {
    let mut seeded: Vec<&Player> = players.to_vec();
    seeded.sort_by(|a, b| b.score.cmp(&a.score));
    seeded.into_iter().map(|p| p.id).collect()
}

/// Interleave the top half with the bottom half so adjacent pairing gives 1 v k+1,
/// 2 v k+2, ...
fn fold_halves(field: &[PlayerId]) -> Vec<PlayerId> {
    let half = (field.len() + 1) / 2;
    let (top, bottom) = field.split_at(half);
    let mut order = Vec::with_capacity(field.len());
    for (i, &p) in top.iter().enumerate() {
        order.push(p);
        if let Some(&q) = bottom.get(i) {
            order.push(q);
        }
    }
    order
}

/// Rematch-free pairing of an even field, windowed first and unrestricted second.
fn pair_field(ranked: &[PlayerId], met: &PlayedPairs, lookahead: usize) -> Option<Vec<Pairing>> {
    let none = HashSet::new();
    for window in [lookahead, usize::MAX] {
        let mut remaining = ranked.to_vec();
        let mut out = Vec::with_capacity(ranked.len() / 2);
        if search(&mut remaining, met, window, 0, &none, &mut out) {
            return Some(out);
        }
        if lookahead >= ranked.len() {
            break;
        }
    }
    None
}

/// Depth-first pairing of `remaining` (best ranked first). The top player tries the
/// next `window` players in order, then a bye if allowed. On failure `remaining` and
/// `out` are restored.
fn search(
    remaining: &mut Vec<PlayerId>,
    played: &PlayedPairs,
    window: usize,
    byes_left: usize,
    bye_eligible: &HashSet<PlayerId>,
    out: &mut Vec<Pairing>,
) -> bool {
    if remaining.is_empty() {
        return true;
    }
    let top = remaining.remove(0);
    let limit = window.min(remaining.len());
    for i in 0..limit {
        let opponent = remaining[i];
        if played.contains(&ordered_pair(top, opponent)) {
            continue;
        }
        remaining.remove(i);
        out.push(Pairing::Match {
            home: top,
            away: opponent,
        });
        if search(remaining, played, window, byes_left, bye_eligible, out) {
            return true;
        }
        out.pop();
        remaining.insert(i, opponent);
    }
    if byes_left > 0 && bye_eligible.contains(&top) {
        out.push(Pairing::Bye(top));
        if search(remaining, played, window, byes_left - 1, bye_eligible, out) {
            return true;
        }
        out.pop();
    }
    remaining.insert(0, top);
    false
}
