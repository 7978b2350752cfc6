//! Single binary web server: JSON REST API over in-memory tournaments.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use ttourney::{
    advance_knockout, generate_group_round, generate_next_rounds, import_roster, simulate_round,
    standings, start_group_stage, start_knockout, GroupId, MatchId, Player, PlayerId, ScoringRules,
    SetScore, Tournament, TournamentConfig, TournamentError, TournamentId,
};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    /// Defaults to today.
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    config: TournamentConfig,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    club: Option<String>,
}

/// A set as `{"home": 11, "away": 9}` or in short notation (`"11:9"`, `"+9"`, `"-3"`).
#[derive(Deserialize)]
#[serde(untagged)]
enum SetEntry {
    Score(SetScore),
    Notation(String),
}

impl SetEntry {
    fn resolve(&self, rules: &ScoringRules) -> Result<SetScore, TournamentError> {
        match self {
            SetEntry::Score(set) => Ok(*set),
            SetEntry::Notation(text) => SetScore::parse(text, rules),
        }
    }
}

#[derive(Deserialize)]
struct RecordSetsBody {
    sets: Vec<SetEntry>,
}

#[derive(Deserialize)]
struct WalkoverBody {
    winner: PlayerId,
}

#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentPlayerPath {
    id: TournamentId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct TournamentGroupPath {
    id: TournamentId,
    group_id: GroupId,
}

#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

fn bad_request(e: impl Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

/// Run `f` on the tournament under the write lock, refreshing its last activity.
fn with_tournament<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
        }
    };
    entry.last_activity = Instant::now();
    f(&mut entry.tournament)
}

/// Apply an action and answer with the updated tournament.
fn update<T, E, F>(state: &AppState, id: TournamentId, action: F) -> HttpResponse
where
    E: Display,
    F: FnOnce(&mut Tournament) -> Result<T, E>,
{
    with_tournament(state, id, |t| match action(&mut *t) {
        Ok(_) => HttpResponse::Ok().json(t),
        Err(e) => bad_request(e),
    })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "ttourney",
    })
}

/// Create a new tournament (returns it with id; client keeps the id for later requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let date = body
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let tournament = match Tournament::new(body.name.trim(), date, body.config) {
        Ok(t) => t,
        Err(e) => return bad_request(e),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    log::info!("Created tournament {} ({})", tournament.name, tournament.id);
    let response = HttpResponse::Ok().json(&tournament);
    g.insert(
        tournament.id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    response
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| HttpResponse::Ok().json(t))
}

/// Register a player (Registration only).
#[post("/api/tournaments/{id}/players")]
async fn api_add_player(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<AddPlayerBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let player = Player::new(body.name, body.score);
    let player = match body.club.as_deref().map(str::trim) {
        Some(club) if !club.is_empty() => player.with_club(club),
        _ => player,
    };
    update(&state, path.id, |t| t.add_registered(player))
}

/// Register a whole CSV roster (`name,score,club` with header); all or nothing.
#[post("/api/tournaments/{id}/players/import")]
async fn api_import_players(
    state: AppState,
    path: Path<TournamentPath>,
    body: String,
) -> HttpResponse {
    update(&state, path.id, |t| import_roster(t, body.as_bytes()))
}

#[delete("/api/tournaments/{id}/players/{player_id}")]
async fn api_remove_player(state: AppState, path: Path<TournamentPlayerPath>) -> HttpResponse {
    update(&state, path.id, |t| t.remove_player(path.player_id))
}

/// Split the roster into groups and open the group stage.
#[post("/api/tournaments/{id}/start")]
async fn api_start_group_stage(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, start_group_stage)
}

/// Generate the next round in every group that still has rounds to play.
#[post("/api/tournaments/{id}/rounds")]
async fn api_generate_rounds(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, generate_next_rounds)
}

#[post("/api/tournaments/{id}/groups/{group_id}/rounds")]
async fn api_generate_group_round(
    state: AppState,
    path: Path<TournamentGroupPath>,
) -> HttpResponse {
    update(&state, path.id, |t| generate_group_round(t, path.group_id))
}

#[get("/api/tournaments/{id}/groups/{group_id}/standings")]
async fn api_group_standings(state: AppState, path: Path<TournamentGroupPath>) -> HttpResponse {
    with_tournament(&state, path.id, |t| match standings(t, path.group_id) {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(e) => bad_request(e),
    })
}

/// Record the sets played so far in a match (group or bracket).
#[put("/api/tournaments/{id}/matches/{match_id}/sets")]
async fn api_record_sets(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<RecordSetsBody>,
) -> HttpResponse {
    update(&state, path.id, |t| {
        let sets = body
            .sets
            .iter()
            .map(|entry| entry.resolve(&t.config.scoring))
            .collect::<Result<Vec<_>, _>>()?;
        t.record_set_result(path.match_id, &sets)
    })
}

#[put("/api/tournaments/{id}/matches/{match_id}/walkover")]
async fn api_record_walkover(
    state: AppState,
    path: Path<TournamentMatchPath>,
    body: Json<WalkoverBody>,
) -> HttpResponse {
    update(&state, path.id, |t| t.record_walkover(path.match_id, body.winner))
}

/// Fill in random results for every open match of the current round.
#[post("/api/tournaments/{id}/simulate")]
async fn api_simulate_round(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, |t| simulate_round(t, &mut rand::thread_rng()))
}

/// Seed the bracket from the group qualifiers (or the roster) and open the knockout.
#[post("/api/tournaments/{id}/knockout")]
async fn api_start_knockout(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, start_knockout)
}

/// Open the next bracket round once the current one is decided.
#[post("/api/tournaments/{id}/knockout/advance")]
async fn api_advance_knockout(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, advance_knockout)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Every 30 minutes, drop tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_player)
            .service(api_import_players)
            .service(api_remove_player)
            .service(api_start_group_stage)
            .service(api_generate_rounds)
            .service(api_generate_group_round)
            .service(api_group_standings)
            .service(api_record_sets)
            .service(api_record_walkover)
            .service(api_simulate_round)
            .service(api_start_knockout)
            .service(api_advance_knockout)
    })
    .bind(bind)?
    .run()
    .await
}
