//! Round robin fixtures via the Berger table (circle method).

use crate::models::{Pairing, PlayerId};

/// Number of rounds a round robin of `n` players takes.
pub fn round_count(n: usize) -> usize {
    match n {
        0 | 1 => 0,
        n if n % 2 == 0 => n - 1,
        n => n,
    }
}

/// Full fixture list: one entry per round, every pair meeting exactly once.
///
/// An odd field gets a placeholder slot; whoever is paired with it sits out that round
/// (one bye per round, one bye per player). Player 0 keeps its seat while the others
/// rotate one position per round, and its home/away side alternates between rounds.
pub fn berger_schedule(players: &[PlayerId]) -> Vec<Vec<Pairing>> {
    let n = players.len();
    if n <= 1 {
        return Vec::new();
    }

    let mut slots: Vec<Option<PlayerId>> = players.iter().copied().map(Some).collect();
    if n % 2 == 1 {
        slots.push(None);
    }
    let size = slots.len();

    let mut rounds = Vec::with_capacity(size - 1);
    for round in 0..size - 1 {
        let mut pairings = Vec::with_capacity(size / 2);
        for i in 0..size / 2 {
            let (mut home, mut away) = (slots[i], slots[size - 1 - i]);
            if i == 0 && round % 2 == 1 {
                std::mem::swap(&mut home, &mut away);
            }
            match (home, away) {
                (Some(home), Some(away)) => pairings.push(Pairing::Match { home, away }),
                (Some(p), None) | (None, Some(p)) => pairings.push(Pairing::Bye(p)),
                (None, None) => {}
            }
        }
        rounds.push(pairings);
        slots[1..].rotate_right(1);
    }
    rounds
}
