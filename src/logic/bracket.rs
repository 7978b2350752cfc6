//! Single-elimination bracket construction and round advancement.

use crate::config::BracketConfig;
use crate::models::{
    Bracket, BracketNode, BracketProgress, BracketRound, GameMatch, PlayerId, Slot,
    TournamentError,
};
use std::collections::HashSet;

/// Seeds (1-based) in bracket position order for a draw of `size` (a power of two).
///
/// Built by folding: every seed `s` of the half-size draw is paired with
/// `2 * len + 1 - s`, so seed 1 meets the lowest seed, seed 2 the next lowest, and the
/// top seeds can only meet in the latest rounds.
pub fn seeding_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let n = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, n + 1 - s]).collect();
    }
    order
}

/// Build a bracket from entrants in seed order (seed 1 first).
///
/// The draw grows to the next power of two and the missing seeds are byes, so byes fall
/// to the top seeds. With a configured main draw smaller than the field, the lowest
/// `2 * (entrants - size)` seeds first play a qualification round whose winners take
/// the last main draw seeds.
pub fn build_bracket(
    seeded: &[PlayerId],
    config: &BracketConfig,
) -> Result<Bracket, TournamentError> {
    let entrants = seeded.len();
    if entrants < 2 {
        return Err(TournamentError::InsufficientPlayers {
            required: 2,
            available: entrants,
        });
    }
    let mut seen = HashSet::new();
    if let Some(&dup) = seeded.iter().find(|p| !seen.insert(**p)) {
        return Err(TournamentError::PlayerScheduledTwice(dup));
    }

    let (size, qualifying) = match config.main_draw_size {
        Some(size) if entrants > size => {
            if entrants > size * 2 {
                return Err(TournamentError::BracketTooSmall { entrants, size });
            }
            (size, entrants - size)
        }
        _ => (entrants.next_power_of_two(), 0),
    };
    let direct = size - qualifying;

    let qualification: Vec<GameMatch> = (0..qualifying)
        .map(|k| GameMatch::new(seeded[direct + k], seeded[entrants - 1 - k], 1))
        .collect();

    let slot = |seed: usize| {
        if seed <= direct.min(entrants) {
            Slot::Seed {
                seed,
                player: seeded[seed - 1],
            }
        } else if qualifying > 0 {
            Slot::QualificationWinner(seed - direct - 1)
        } else {
            Slot::Bye
        }
    };

    let order = seeding_order(size);
    let mut rounds = vec![BracketRound {
        name: round_name(size / 2),
        nodes: order
            .chunks_exact(2)
            .map(|pair| BracketNode::new(slot(pair[0]), slot(pair[1])))
            .collect(),
    }];
    let mut nodes = size / 2;
    while nodes > 1 {
        nodes /= 2;
        rounds.push(BracketRound {
            name: round_name(nodes),
            nodes: (0..nodes)
                .map(|i| BracketNode::new(Slot::WinnerOf(2 * i), Slot::WinnerOf(2 * i + 1)))
                .collect(),
        });
    }

    let mut bracket = Bracket {
        size,
        seeds: seeded.to_vec(),
        qualification,
        rounds,
        progress: BracketProgress::Qualification,
    };
    if qualifying == 0 {
        open_round(&mut bracket, 0)?;
        bracket.progress = BracketProgress::Round(0);
    }
    log::info!(
        "Bracket built: {} entrants, draw of {}, {} byes, {} qualification matches",
        entrants,
        size,
        bracket.byes(),
        qualifying
    );
    Ok(bracket)
}

/// Move on to the next stage once every match of the current one is decided.
/// Winners come only from recorded results.
pub fn advance_bracket(bracket: &mut Bracket) -> Result<BracketProgress, TournamentError> {
    let next = match bracket.progress {
        BracketProgress::Qualification => {
            if !bracket.qualification.iter().all(GameMatch::is_terminal) {
                return Err(TournamentError::IncompleteRound);
            }
            open_round(bracket, 0)?;
            BracketProgress::Round(0)
        }
        BracketProgress::Round(r) => {
            if !bracket.rounds[r].nodes.iter().all(BracketNode::is_decided) {
                return Err(TournamentError::IncompleteRound);
            }
            if r + 1 == bracket.rounds.len() {
                BracketProgress::Finished
            } else {
                open_round(bracket, r + 1)?;
                BracketProgress::Round(r + 1)
            }
        }
        BracketProgress::Finished => return Err(TournamentError::InvalidState),
    };
    bracket.progress = next;
    Ok(next)
}

#[derive(Clone, Copy)]
enum Entrant {
    Player(PlayerId),
    Bye,
}

fn resolve(bracket: &Bracket, round: usize, slot: Slot) -> Result<Entrant, TournamentError> {
    let winner = match slot {
        Slot::Seed { player, .. } => return Ok(Entrant::Player(player)),
        Slot::Bye => return Ok(Entrant::Bye),
        Slot::QualificationWinner(k) => bracket.qualification.get(k).and_then(GameMatch::winner),
        Slot::WinnerOf(i) => round
            .checked_sub(1)
            .and_then(|prev| bracket.rounds[prev].nodes.get(i))
            .and_then(BracketNode::winner),
    };
    winner
        .map(Entrant::Player)
        .ok_or(TournamentError::IncompleteRound)
}

/// Create the matches of main draw round `round`; all sides must be resolvable.
fn open_round(bracket: &mut Bracket, round: usize) -> Result<(), TournamentError> {
    let offset = if bracket.qualification.is_empty() { 1 } else { 2 };
    let number = (round + offset) as u32;
    let mut games = Vec::with_capacity(bracket.rounds[round].nodes.len());
    for node in &bracket.rounds[round].nodes {
        let top = resolve(bracket, round, node.top)?;
        let bottom = resolve(bracket, round, node.bottom)?;
        let game = match (top, bottom) {
            (Entrant::Player(a), Entrant::Player(b)) => GameMatch::new(a, b, number),
            (Entrant::Player(p), Entrant::Bye) | (Entrant::Bye, Entrant::Player(p)) => {
                GameMatch::bye(p, number, true)
            }
            (Entrant::Bye, Entrant::Bye) => return Err(TournamentError::InvalidState),
        };
        games.push(game);
    }
    for (node, game) in bracket.rounds[round].nodes.iter_mut().zip(games) {
        node.game = Some(game);
    }
    log::info!("Bracket: {} opened", bracket.rounds[round].name);
    Ok(())
}

fn round_name(nodes: usize) -> String {
    match nodes {
        1 => "Final".to_string(),
        2 => "Semi-final".to_string(),
        4 => "Quarter-final".to_string(),
        n => format!("Round of {}", n * 2),
    }
}
