//! Berger table fixtures.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use ttourney::logic::{berger_schedule, round_count};
use ttourney::models::{Pairing, PlayerId};
use uuid::Uuid;

fn ids(n: usize) -> Vec<PlayerId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

fn pair_key(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[test]
fn five_players_take_five_rounds_with_one_bye_each() {
    let players = ids(5);
    let rounds = berger_schedule(&players);
    assert_eq!(rounds.len(), 5);
    assert_eq!(round_count(5), 5);

    let mut matches = 0;
    let mut byes: HashMap<PlayerId, usize> = HashMap::new();
    for round in &rounds {
        let round_byes: Vec<_> = round
            .iter()
            .filter_map(|p| match p {
                Pairing::Bye(p) => Some(*p),
                Pairing::Match { .. } => None,
            })
            .collect();
        assert_eq!(round_byes.len(), 1);
        *byes.entry(round_byes[0]).or_default() += 1;
        matches += round.len() - 1;
    }
    assert_eq!(matches, 10);
    assert_eq!(byes.len(), 5);
    assert!(byes.values().all(|&n| n == 1));
}

#[test]
fn six_players_take_five_rounds_of_three_matches() {
    let rounds = berger_schedule(&ids(6));
    assert_eq!(rounds.len(), 5);
    for round in rounds {
        assert_eq!(round.len(), 3);
        assert!(round.iter().all(|p| matches!(p, Pairing::Match { .. })));
    }
}

#[test]
fn fixed_player_alternates_sides() {
    let players = ids(4);
    let rounds = berger_schedule(&players);
    let side = |round: &[Pairing]| {
        round.iter().find_map(|p| match *p {
            Pairing::Match { home, .. } if home == players[0] => Some("home"),
            Pairing::Match { away, .. } if away == players[0] => Some("away"),
            _ => None,
        })
    };
    assert_eq!(side(&rounds[0]), Some("home"));
    assert_eq!(side(&rounds[1]), Some("away"));
    assert_eq!(side(&rounds[2]), Some("home"));
}

#[test]
fn tiny_fields() {
    assert!(berger_schedule(&[]).is_empty());
    assert!(berger_schedule(&ids(1)).is_empty());
    let two = ids(2);
    let rounds = berger_schedule(&two);
    assert_eq!(rounds.len(), 1);
    assert_eq!(
        rounds[0],
        vec![Pairing::Match {
            home: two[0],
            away: two[1]
        }]
    );
    assert_eq!(round_count(0), 0);
    assert_eq!(round_count(1), 0);
    assert_eq!(round_count(8), 7);
}

proptest! {
    #[test]
    fn every_pair_meets_exactly_once(n in 2usize..18) {
        let players = ids(n);
        let rounds = berger_schedule(&players);
        prop_assert_eq!(rounds.len(), round_count(n));

        let mut pairs = HashSet::new();
        let mut byes: HashMap<PlayerId, usize> = HashMap::new();
        for round in &rounds {
            let mut seen = HashSet::new();
            for pairing in round {
                match *pairing {
                    Pairing::Match { home, away } => {
                        prop_assert!(seen.insert(home));
                        prop_assert!(seen.insert(away));
                        prop_assert!(pairs.insert(pair_key(home, away)));
                    }
                    Pairing::Bye(p) => {
                        prop_assert!(seen.insert(p));
                        *byes.entry(p).or_default() += 1;
                    }
                }
            }
            // everyone is scheduled every round, as a match or the bye
            prop_assert_eq!(seen.len(), n);
        }
        prop_assert_eq!(pairs.len(), n * (n - 1) / 2);
        if n % 2 == 1 {
            prop_assert_eq!(byes.len(), n);
            prop_assert!(byes.values().all(|&b| b == 1));
        } else {
            prop_assert!(byes.is_empty());
        }
    }
}
