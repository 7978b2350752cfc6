//! Simulated results.

use rand::rngs::StdRng;
use rand::SeedableRng;
use ttourney::logic::{simulate_match, simulate_set};
use ttourney::models::{GameMatch, Player};
use ttourney::ScoringRules;

#[test]
fn simulated_sets_are_always_legal() {
    let mut rng = StdRng::seed_from_u64(1);
    let rules = ScoringRules::default();
    for _ in 0..500 {
        let set = simulate_set(&mut rng, 1500, 1400, &rules);
        assert!(set.validate(&rules).is_ok(), "{set:?}");
    }
    let short = ScoringRules {
        points_to_win_set: 21,
        ..ScoringRules::default()
    };
    for _ in 0..100 {
        assert!(simulate_set(&mut rng, 1000, 1000, &short).validate(&short).is_ok());
    }
}

#[test]
fn simulated_matches_complete_in_one_recording() {
    let mut rng = StdRng::seed_from_u64(2);
    let rules = ScoringRules::default();
    let (a, b) = (Player::new("A", 1600), Player::new("B", 1500));
    for _ in 0..100 {
        let sets = simulate_match(&mut rng, &a, &b, &rules);
        assert!((3..=5).contains(&sets.len()));
        let mut m = GameMatch::new(a.id, b.id, 1);
        assert_eq!(m.record_sets(&sets, &rules), Ok(true));
    }
}

#[test]
fn the_stronger_player_usually_wins() {
    let mut rng = StdRng::seed_from_u64(3);
    let rules = ScoringRules::default();
    let (strong, weak) = (Player::new("Strong", 2000), Player::new("Weak", 1000));
    let wins = (0..200)
        .filter(|_| {
            let sets = simulate_match(&mut rng, &strong, &weak, &rules);
            sets.iter().filter(|s| s.home_won()).count() == 3
        })
        .count();
    assert!(wins > 150, "strong player won only {wins} of 200");
}
