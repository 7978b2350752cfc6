//! Standings: points, Buchholz and the ranking derived from match history.
//!
//! Nothing here mutates players or matches; standings are recomputed from scratch on
//! every call and work on any subset of matches (e.g. a partially played round).

use crate::config::ScoringRules;
use crate::models::{GameMatch, MatchStatus, Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One player's line in the standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub player_id: PlayerId,
    /// 1-based position; unique within one computation.
    pub rank: usize,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub byes: u32,
    pub points: u32,
    /// Sum of the points of every opponent met in a Completed match.
    pub buchholz: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub balls_won: u32,
    pub balls_lost: u32,
}

impl Standing {
    fn empty(player_id: PlayerId) -> Self {
        Self {
            player_id,
            rank: 0,
            played: 0,
            wins: 0,
            losses: 0,
            byes: 0,
            points: 0,
            buchholz: 0,
            sets_won: 0,
            sets_lost: 0,
            balls_won: 0,
            balls_lost: 0,
        }
    }

    pub fn set_difference(&self) -> i64 {
        i64::from(self.sets_won) - i64::from(self.sets_lost)
    }

    pub fn ball_difference(&self) -> i64 {
        i64::from(self.balls_won) - i64::from(self.balls_lost)
    }
}

/// Compute the ranked standings of `players` over `matches`.
///
/// Order: points, Buchholz, head-to-head, set difference, ball difference, seeding
/// score (all descending), then the order in which `players` was given. The last key
/// makes the order total. Matches that are not terminal are ignored.
///
/// Head-to-head applies to a run of players level on points and Buchholz only if every
/// pair in the run has a Completed match against each other; they are then ordered by
/// the wins they took from the others in the run.
pub fn compute_standings<'a>(
    players: impl IntoIterator<Item = &'a Player>,
    matches: impl IntoIterator<Item = &'a GameMatch>,
    rules: &ScoringRules,
) -> Vec<Standing> {
    let players: Vec<&Player> = players.into_iter().collect();
    let index: HashMap<PlayerId, usize> =
        players.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
    let mut table: Vec<Standing> = players.iter().map(|p| Standing::empty(p.id)).collect();
    let mut opponents: Vec<Vec<usize>> = vec![Vec::new(); players.len()];
    // (home, away, winner) of every Completed match between two listed players
    let mut duels: Vec<(usize, usize, usize)> = Vec::new();

    for m in matches.into_iter().filter(|m| m.is_terminal()) {
        let Some(winner) = m.winner() else { continue };
        let Some(away) = m.away else {
            if let Some(&w) = index.get(&winner) {
                table[w].byes += 1;
                if m.scored {
                    table[w].wins += 1;
                    table[w].points += rules.points_for_win;
                }
            }
            continue;
        };

        let home = index.get(&m.home).copied();
        let away = index.get(&away).copied();
        let completed = m.status() == MatchStatus::Completed;
        if let (true, Some(h), Some(a), Some(&w)) = (completed, home, away, index.get(&winner)) {
            duels.push((h, a, w));
        }
        for (me, other, my_side_home) in [(home, away, true), (away, home, false)] {
            let Some(me) = me else { continue };
            let row = &mut table[me];
            row.played += 1;
            if players[me].id == winner {
                row.wins += 1;
                row.points += rules.points_for_win;
            } else {
                row.losses += 1;
                row.points += rules.points_for_loss;
            }
            if completed {
                let (home_sets, away_sets) = m.set_tally();
                let (home_balls, away_balls) = m
                    .sets()
                    .iter()
                    .fold((0, 0), |(h, a), s| (h + s.home, a + s.away));
                if my_side_home {
                    row.sets_won += home_sets;
                    row.sets_lost += away_sets;
                    row.balls_won += home_balls;
                    row.balls_lost += away_balls;
                } else {
                    row.sets_won += away_sets;
                    row.sets_lost += home_sets;
                    row.balls_won += away_balls;
                    row.balls_lost += home_balls;
                }
                if let Some(other) = other {
                    opponents[me].push(other);
                }
            }
        }
    }

    let points: Vec<u32> = table.iter().map(|s| s.points).collect();
    for (row, faced) in table.iter_mut().zip(&opponents) {
        row.buchholz = faced.iter().map(|&o| points[o]).sum();
    }

    let mut order: Vec<usize> = (0..table.len()).collect();
    order.sort_by(|&a, &b| {
        compare(&table[a], &table[b])
            .then_with(|| players[b].score.cmp(&players[a].score))
            .then(a.cmp(&b))
    });
    break_ties_head_to_head(&mut order, &table, &duels);

    order
        .into_iter()
        .enumerate()
        .map(|(pos, i)| Standing {
            rank: pos + 1,
            ..table[i].clone()
        })
        .collect()
}

/// Reorder each run of players level on points and Buchholz by their mutual wins.
/// The sort is stable, so the remaining keys still decide within equal mutual wins.
fn break_ties_head_to_head(
    order: &mut [usize],
    table: &[Standing],
    duels: &[(usize, usize, usize)],
) {
    let level = |a: &Standing, b: &Standing| a.points == b.points && a.buchholz == b.buchholz;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && level(&table[order[start]], &table[order[end]]) {
            end += 1;
        }
        let run = &mut order[start..end];
        start = end;
        if run.len() < 2 {
            continue;
        }

        let in_run = |p: usize| run.contains(&p);
        let mutual: Vec<_> = duels
            .iter()
            .filter(|&&(h, a, _)| in_run(h) && in_run(a))
            .collect();
        let all_met = run.iter().enumerate().all(|(i, &p)| {
            run[i + 1..].iter().all(|&q| {
                mutual
                    .iter()
                    .any(|&&(h, a, _)| (h == p && a == q) || (h == q && a == p))
            })
        });
        if !all_met {
            continue;
        }
        let wins: HashMap<usize, usize> = run
            .iter()
            .map(|&p| (p, mutual.iter().filter(|&&&(_, _, w)| w == p).count()))
            .collect();
        run.sort_by(|a, b| wins[b].cmp(&wins[a]));
    }
}

/// Compare two standings on the sporting criteria only (better first). Head-to-head
/// needs the matches, so only [`compute_standings`] applies it.
pub fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(b.buchholz.cmp(&a.buchholz))
        .then(b.set_difference().cmp(&a.set_difference()))
        .then(b.ball_difference().cmp(&a.ball_difference()))
}

/// Player ids in ranking order.
pub fn rank_players<'a>(
    players: impl IntoIterator<Item = &'a Player>,
    matches: impl IntoIterator<Item = &'a GameMatch>,
    rules: &ScoringRules,
) -> Vec<PlayerId> {
    compute_standings(players, matches, rules)
        .into_iter()
        .map(|s| s.player_id)
        .collect()
}
