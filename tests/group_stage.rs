//! Group stage: group creation, round generation and qualifier selection.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use ttourney::logic::{
    create_groups, generate_group_round, generate_next_rounds, select_qualifiers, simulate_round,
    standings, start_group_stage,
};
use ttourney::models::{GameMatch, MatchStatus, Player, Round, SetScore};
use ttourney::{
    ByePolicy, GroupConfig, GroupFormat, Tournament, TournamentConfig, TournamentError,
    TournamentState,
};

fn tournament(n: usize, group: GroupConfig) -> Tournament {
    let config = TournamentConfig {
        group,
        ..TournamentConfig::default()
    };
    let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
    let mut t = Tournament::new("Spring Open", date, config).unwrap();
    for i in 0..n {
        t.add_player(format!("Player {i}"), 2000 - 10 * i as u32).unwrap();
    }
    t
}

fn win_open_matches(t: &mut Tournament) {
    let open: Vec<_> = t
        .groups
        .iter()
        .filter_map(|g| g.current_round())
        .flat_map(|r| r.matches.iter())
        .filter(|m| !m.is_terminal())
        .map(|m| m.id)
        .collect();
    for id in open {
        t.record_set_result(id, &[SetScore::new(11, 9); 3]).unwrap();
    }
}

#[test]
fn groups_are_dealt_in_a_serpentine() {
    let players: Vec<Player> = (0..8)
        .map(|i| Player::new(format!("P{i}"), 100 * (i + 1)))
        .collect();
    let groups = create_groups(&players, &GroupConfig::default()).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "Group A");
    assert_eq!(groups[1].name, "Group B");

    // strongest first: P7 P6 P5 ... dealt A B B A A B B A
    let by_score = |i: usize| players[7 - i].id;
    assert_eq!(groups[0].players, vec![by_score(0), by_score(3), by_score(4), by_score(7)]);
    assert_eq!(groups[1].players, vec![by_score(1), by_score(2), by_score(5), by_score(6)]);
}

#[test]
fn leftover_players_join_existing_groups() {
    let players: Vec<Player> = (0..7).map(|i| Player::new(format!("P{i}"), 0)).collect();
    let groups = create_groups(&players, &GroupConfig::default()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].players.len(), 7);
    // equal scores keep registration order
    let ids: Vec<_> = players.iter().map(|p| p.id).collect();
    assert_eq!(groups[0].players, ids);

    assert_eq!(
        create_groups(&players[..1], &GroupConfig::default()),
        Err(TournamentError::InsufficientPlayers {
            required: 2,
            available: 1
        })
    );
}

#[test]
fn start_group_stage_only_from_registration() {
    let mut t = tournament(8, GroupConfig::default());
    start_group_stage(&mut t).unwrap();
    assert_eq!(t.state, TournamentState::GroupStage);
    assert_eq!(t.groups.len(), 2);
    assert_eq!(start_group_stage(&mut t), Err(TournamentError::InvalidState));
    assert_eq!(t.add_player("Late", 1000), Err(TournamentError::InvalidState));
}

#[test]
fn round_robin_group_plays_every_opponent_once() {
    let mut t = tournament(4, GroupConfig::default());
    start_group_stage(&mut t).unwrap();
    let group_id = t.groups[0].id;

    for round in 1..=3 {
        assert_eq!(generate_next_rounds(&mut t), Ok(1));
        assert_eq!(t.groups[0].rounds.len(), round);
        assert_eq!(
            generate_group_round(&mut t, group_id),
            Err(TournamentError::IncompleteRound)
        );
        win_open_matches(&mut t);
    }
    assert!(t.groups[0].is_finished());
    assert_eq!(
        generate_group_round(&mut t, group_id),
        Err(TournamentError::GroupFinished("Group A".into()))
    );
    assert_eq!(generate_next_rounds(&mut t), Ok(0));

    let pairs: HashSet<_> = t.groups[0]
        .matches()
        .map(|m| {
            let mut p = [m.home, m.away.unwrap()];
            p.sort();
            p
        })
        .collect();
    assert_eq!(pairs.len(), 6);
    let group = &t.groups[0];
    for a in &group.players {
        for b in group.players.iter().filter(|b| *b != a) {
            assert!(group.have_met(*a, *b));
        }
    }

    let table = standings(&t, group_id).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.iter().map(|s| s.played).sum::<u32>(), 12);
    assert_eq!(table.iter().map(|s| s.points).sum::<u32>(), 12);
}

#[test]
fn recorded_round_robin_byes_carry_no_points() {
    let group = GroupConfig {
        players_per_group: 5,
        round_robin_bye: ByePolicy::RecordWithoutPoints,
        ..GroupConfig::default()
    };
    let mut t = tournament(5, group);
    start_group_stage(&mut t).unwrap();
    let group_id = t.groups[0].id;
    generate_group_round(&mut t, group_id).unwrap();

    let round = t.groups[0].current_round().unwrap();
    assert_eq!(round.matches.len(), 3);
    let byes: Vec<&GameMatch> = round.matches.iter().filter(|m| m.is_bye()).collect();
    assert_eq!(byes.len(), 1);
    assert_eq!(byes[0].status(), MatchStatus::Walkover);
    assert!(!byes[0].scored);
    assert!(t.groups[0].players.iter().all(|p| round.contains_player(*p)));

    let table = standings(&t, group_id).unwrap();
    let bye_row = table.iter().find(|s| s.player_id == byes[0].home).unwrap();
    assert_eq!((bye_row.byes, bye_row.points), (1, 0));
}

#[test]
fn skipped_round_robin_byes_leave_no_match() {
    let group = GroupConfig {
        players_per_group: 5,
        ..GroupConfig::default()
    };
    let mut t = tournament(5, group);
    start_group_stage(&mut t).unwrap();
    generate_next_rounds(&mut t).unwrap();
    let round = t.groups[0].current_round().unwrap();
    assert_eq!(round.matches.len(), 2);
    assert_eq!(round.byes().count(), 0);
    assert_eq!(t.groups[0].planned_rounds(), 5);
}

#[test]
fn swiss_group_runs_its_round_budget_without_rematches() {
    let group = GroupConfig {
        players_per_group: 8,
        format: GroupFormat::Swiss { rounds: 3 },
        ..GroupConfig::default()
    };
    let mut t = tournament(8, group);
    start_group_stage(&mut t).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..3 {
        assert_eq!(generate_next_rounds(&mut t), Ok(1));
        assert_eq!(simulate_round(&mut t, &mut rng), Ok(4));
    }
    assert!(t.groups[0].is_finished());
    assert_eq!(t.groups[0].played_pairs().len(), 12);
    let group_id = t.groups[0].id;
    assert_eq!(
        generate_group_round(&mut t, group_id),
        Err(TournamentError::GroupFinished("Group A".into()))
    );
}

#[test]
fn qualifiers_are_ranked_by_placement_across_groups() {
    let mut t = tournament(8, GroupConfig::default());
    start_group_stage(&mut t).unwrap();
    assert_eq!(
        select_qualifiers(&t.groups, &t.players, &t.config.scoring, 2),
        Err(TournamentError::IncompleteRound)
    );

    let mut rng = StdRng::seed_from_u64(42);
    while generate_next_rounds(&mut t).unwrap() > 0 {
        simulate_round(&mut t, &mut rng).unwrap();
    }
    let qualified = select_qualifiers(&t.groups, &t.players, &t.config.scoring, 2).unwrap();
    assert_eq!(qualified.len(), 4);

    let winners: HashSet<_> = t
        .groups
        .iter()
        .map(|g| standings(&t, g.id).unwrap()[0].player_id)
        .collect();
    let runners_up: HashSet<_> = t
        .groups
        .iter()
        .map(|g| standings(&t, g.id).unwrap()[1].player_id)
        .collect();
    assert_eq!(qualified[..2].iter().copied().collect::<HashSet<_>>(), winners);
    assert_eq!(qualified[2..].iter().copied().collect::<HashSet<_>>(), runners_up);
}

#[test]
fn group_rounds_need_the_group_stage() {
    let mut t = tournament(4, GroupConfig::default());
    assert_eq!(generate_next_rounds(&mut t), Err(TournamentError::InvalidState));
    start_group_stage(&mut t).unwrap();
    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        generate_group_round(&mut t, missing),
        Err(TournamentError::GroupNotFound(missing))
    );
}

#[test]
fn rejected_rounds_leave_the_group_untouched() {
    let mut t = tournament(4, GroupConfig::default());
    start_group_stage(&mut t).unwrap();
    generate_next_rounds(&mut t).unwrap();
    win_open_matches(&mut t);

    let mut group = t.groups[0].clone();
    let before = group.rounds.clone();
    let first = &before[0].matches;
    let (a, b) = (first[0].home, first[0].away.unwrap());
    let (c, d) = (first[1].home, first[1].away.unwrap());

    let rematch = Round::new(2, vec![GameMatch::new(b, a, 2), GameMatch::new(c, a, 2)]);
    assert_eq!(
        group.push_round(rematch),
        Err(TournamentError::DuplicateMatch(b, a))
    );
    assert_eq!(group.rounds, before);

    let twice = Round::new(2, vec![GameMatch::new(a, c, 2), GameMatch::new(a, d, 2)]);
    assert_eq!(
        group.push_round(twice),
        Err(TournamentError::PlayerScheduledTwice(a))
    );
    assert_eq!(group.rounds, before);

    let fresh = Round::new(2, vec![GameMatch::new(a, c, 2), GameMatch::new(b, d, 2)]);
    assert_eq!(group.push_round(fresh), Ok(()));
    assert_eq!(group.rounds.len(), 2);
}
