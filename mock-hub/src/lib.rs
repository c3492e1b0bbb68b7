//! In-memory emulation of the pet-feeder hub's local HTTP API.
//!
//! Serves `/local-api` and the `set_*` endpoints against a shared
//! [`DeviceState`], mirroring the hub's behavior: writes are full-value
//! replaces acked with an empty 200, a game change is staged as the queued
//! game, and out-of-range values get a 400 with a JSON error body. The
//! `flaky` counter makes the next N requests fail with 503 so clients can
//! exercise their retry handling.
//!
//! DTOs here are defined independently from the client crate; the client's
//! integration tests catch schema drift.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Wire names the hub accepts for a game level.
const GAMES: [&str; 12] = [
    "GAME0", "GAME1", "GAME2", "GAME3", "GAME4", "GAME5", "GAME6", "GAME7", "GAME8", "GAME9",
    "GAME10", "GAME11",
];

/// Wire names the hub accepts for its mode.
const HUB_MODES: [&str; 3] = ["STAY_OFF", "STAY_ON", "SCHEDULED"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WindowBody {
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleBody {
    pub weekday: WindowBody,
    pub weekend: WindowBody,
}

/// Mutable device state backing the emulated API.
#[derive(Clone, Debug)]
pub struct DeviceState {
    pub game: String,
    pub queued_game: String,
    pub hub_mode: String,
    pub max_kibbles: u32,
    pub timezone: i8,
    pub dst: bool,
    pub schedule: Option<ScheduleBody>,
    pub kibbles_eaten_today: u32,
    /// While positive, each incoming request decrements this and fails
    /// with 503.
    pub flaky: u32,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            game: "GAME0".to_string(),
            queued_game: "GAME0".to_string(),
            hub_mode: "STAY_ON".to_string(),
            max_kibbles: 0,
            timezone: 0,
            dst: false,
            schedule: None,
            kibbles_eaten_today: 0,
            flaky: 0,
        }
    }
}

pub type Db = Arc<RwLock<DeviceState>>;

pub fn default_state() -> Db {
    Arc::new(RwLock::new(DeviceState::default()))
}

pub fn app() -> Router {
    app_with_state(default_state())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/local-api", get(get_status))
        .route("/local-api/set_game", post(set_game))
        .route("/local-api/set_max_kibbles", post(set_max_kibbles))
        .route("/local-api/set_dst", post(set_dst))
        .route("/local-api/set_timezone", post(set_timezone))
        .route("/local-api/set_hub_mode", post(set_hub_mode))
        .route("/local-api/set_schedule", post(set_schedule))
        .fallback(not_found)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

/// Consume one unit of injected flakiness, if any.
fn flaked(state: &mut DeviceState) -> bool {
    if state.flaky > 0 {
        state.flaky -= 1;
        true
    } else {
        false
    }
}

fn busy() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"error": "hub busy"})),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "no such endpoint"})),
    )
        .into_response()
}

async fn get_status(State(db): State<Db>) -> Response {
    let mut state = db.write().await;
    if flaked(&mut state) {
        return busy();
    }
    let hub_state = if state.hub_mode == "STAY_OFF" {
        "Standby"
    } else {
        "Active"
    };
    let body = json!({
        "time": Local::now().format("%a %b %d %H:%M:%S %Y").to_string(),
        "hub_mode": state.hub_mode.clone(),
        "game": state.game.clone(),
        "queued_game": state.queued_game.clone(),
        "hub_state": hub_state,
        "report": "Your hub is working.",
        "max_kibbles": state.max_kibbles,
        "timezone": state.timezone,
        "dst": state.dst,
        "schedule": state.schedule.clone(),
        "kibbles_eaten_today": state.kibbles_eaten_today,
    });
    Json(body).into_response()
}

#[derive(Deserialize)]
struct SetGame {
    game: String,
}

async fn set_game(State(db): State<Db>, Json(input): Json<SetGame>) -> Response {
    let mut state = db.write().await;
    if flaked(&mut state) {
        return busy();
    }
    if !GAMES.contains(&input.game.as_str()) {
        return bad_request("unknown game");
    }
    debug!(game = %input.game, "staging game change");
    state.queued_game = input.game;
    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
struct SetMaxKibbles {
    max_kibbles: u32,
}

async fn set_max_kibbles(State(db): State<Db>, Json(input): Json<SetMaxKibbles>) -> Response {
    let mut state = db.write().await;
    if flaked(&mut state) {
        return busy();
    }
    if input.max_kibbles > 500 {
        return bad_request("max_kibbles above hopper bound");
    }
    state.max_kibbles = input.max_kibbles;
    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
struct SetDst {
    dst: bool,
}

async fn set_dst(State(db): State<Db>, Json(input): Json<SetDst>) -> Response {
    let mut state = db.write().await;
    if flaked(&mut state) {
        return busy();
    }
    state.dst = input.dst;
    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
struct SetTimezone {
    timezone: i8,
}

async fn set_timezone(State(db): State<Db>, Json(input): Json<SetTimezone>) -> Response {
    let mut state = db.write().await;
    if flaked(&mut state) {
        return busy();
    }
    if !(-12..=13).contains(&input.timezone) {
        return bad_request("timezone outside [-12, 13]");
    }
    state.timezone = input.timezone;
    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
struct SetHubMode {
    hub_mode: String,
}

async fn set_hub_mode(State(db): State<Db>, Json(input): Json<SetHubMode>) -> Response {
    let mut state = db.write().await;
    if flaked(&mut state) {
        return busy();
    }
    if !HUB_MODES.contains(&input.hub_mode.as_str()) {
        return bad_request("unknown hub mode");
    }
    state.hub_mode = input.hub_mode;
    StatusCode::OK.into_response()
}

#[derive(Deserialize)]
struct SetSchedule {
    schedule: ScheduleBody,
}

async fn set_schedule(State(db): State<Db>, Json(input): Json<SetSchedule>) -> Response {
    let mut state = db.write().await;
    if flaked(&mut state) {
        return busy();
    }
    // Stored in any mode; only governs activity while hub_mode is SCHEDULED.
    state.schedule = Some(input.schedule);
    StatusCode::OK.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_on_and_unlimited() {
        let state = DeviceState::default();
        assert_eq!(state.hub_mode, "STAY_ON");
        assert_eq!(state.max_kibbles, 0);
        assert!(state.schedule.is_none());
        assert_eq!(state.flaky, 0);
    }

    #[test]
    fn flaked_consumes_one_unit() {
        let mut state = DeviceState {
            flaky: 2,
            ..DeviceState::default()
        };
        assert!(flaked(&mut state));
        assert!(flaked(&mut state));
        assert!(!flaked(&mut state));
    }
}
