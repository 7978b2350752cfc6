//! Roster import from CSV: one player per row, `name,score[,club]` with a header line.

use crate::models::{Player, PlayerId, Tournament, TournamentError};
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("could not read roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
    #[error(transparent)]
    Tournament(#[from] TournamentError),
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    score: u32,
    #[serde(default)]
    club: Option<String>,
}

/// Parse a roster. Surrounding whitespace is trimmed; an empty club is no club.
pub fn read_roster<R: Read>(reader: R) -> Result<Vec<Player>, RosterError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut players = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let row: RosterRow = record
            .deserialize(Some(&headers))
            .map_err(|e| RosterError::InvalidRow {
                line,
                reason: e.to_string(),
            })?;
        if row.name.is_empty() {
            return Err(RosterError::InvalidRow {
                line,
                reason: "empty player name".into(),
            });
        }
        let player = Player::new(row.name, row.score);
        players.push(match row.club.filter(|c| !c.is_empty()) {
            Some(club) => player.with_club(club),
            None => player,
        });
    }
    Ok(players)
}

/// Register every player of a CSV roster. Either the whole roster is added or, on the
/// first bad row or rejected player, nothing is.
pub fn import_roster<R: Read>(
    tournament: &mut Tournament,
    reader: R,
) -> Result<Vec<PlayerId>, RosterError> {
    let players = read_roster(reader)?;
    let mut staged = tournament.clone();
    let ids = players
        .into_iter()
        .map(|p| staged.add_registered(p))
        .collect::<Result<Vec<_>, _>>()?;
    *tournament = staged;
    log::info!("{}: imported {} players", tournament.name, ids.len());
    Ok(ids)
}
