//! CSV roster import.

use chrono::NaiveDate;
use ttourney::{
    import_roster, read_roster, RosterError, Tournament, TournamentConfig, TournamentError,
};

fn empty_tournament() -> Tournament {
    let date = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
    Tournament::new("Autumn Open", date, TournamentConfig::default()).unwrap()
}

#[test]
fn reads_names_scores_and_clubs() {
    let csv = "name,score,club\nAnna Berg, 1520 ,TTC Nord\nBen Ortiz,1480,\n";
    let players = read_roster(csv.as_bytes()).unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].name, "Anna Berg");
    assert_eq!(players[0].score, 1520);
    assert_eq!(players[0].club.as_deref(), Some("TTC Nord"));
    assert_eq!(players[1].club, None);
}

#[test]
fn club_column_is_optional() {
    let players = read_roster("name,score\nAnna,1500\nBen,1400\n".as_bytes()).unwrap();
    assert_eq!(players.len(), 2);
    assert!(players.iter().all(|p| p.club.is_none()));
}

#[test]
fn bad_rows_report_their_line() {
    let err = read_roster("name,score\nAnna,1500\nBen,lots\n".as_bytes()).unwrap_err();
    assert!(matches!(err, RosterError::InvalidRow { line: 3, .. }), "{err}");

    let err = read_roster("name,score\n,1500\n".as_bytes()).unwrap_err();
    assert!(matches!(err, RosterError::InvalidRow { line: 2, .. }), "{err}");
}

#[test]
fn import_registers_everyone_in_order() {
    let mut t = empty_tournament();
    let csv = "name,score,club\nAnna,1500,A\nBen,1400,B\n";
    let ids = import_roster(&mut t, csv.as_bytes()).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(t.players[0].start_number, 1);
    assert_eq!(t.players[1].start_number, 2);
    assert_eq!(t.players[1].id, ids[1]);
}

#[test]
fn import_is_all_or_nothing() {
    let mut t = empty_tournament();
    t.add_player("Anna", 1500).unwrap();
    let err = import_roster(&mut t, "name,score\nBen,1400\nanna,1300\n".as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        RosterError::Tournament(TournamentError::DuplicatePlayerName)
    ));
    assert_eq!(t.players.len(), 1);
}
