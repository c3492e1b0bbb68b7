//! Builds wire requests and parses hub responses.
//!
//! # Design
//! Pure functions on both sides of the I/O boundary: `build_*` maps an
//! already-validated config value to the method, path and JSON body the hub
//! expects; `parse_*` consumes the raw response. Encoding cannot fail —
//! inputs are validated at construction — so the build functions return
//! `HttpRequest` directly. Non-2xx responses surface as
//! [`HubError::Device`] with the hub's payload untouched.

use serde_json::json;

use crate::error::{HubError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Game, HubMode, MaxKibbles, Schedule, Status, TimezoneOffset};

fn get(path: &str) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        path: path.to_string(),
        headers: Vec::new(),
        body: None,
    }
}

fn post_json(path: &str, body: serde_json::Value) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Post,
        path: path.to_string(),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body.to_string()),
    }
}

pub fn build_status() -> HttpRequest {
    get("/local-api")
}

pub fn build_set_game(game: Game) -> HttpRequest {
    post_json("/local-api/set_game", json!({ "game": game }))
}

pub fn build_set_max_kibbles(max_kibbles: MaxKibbles) -> HttpRequest {
    post_json(
        "/local-api/set_max_kibbles",
        json!({ "max_kibbles": max_kibbles }),
    )
}

pub fn build_set_dst(dst_on: bool) -> HttpRequest {
    post_json("/local-api/set_dst", json!({ "dst": dst_on }))
}

pub fn build_set_timezone(offset: TimezoneOffset) -> HttpRequest {
    post_json("/local-api/set_timezone", json!({ "timezone": offset }))
}

pub fn build_set_hub_mode(mode: HubMode) -> HttpRequest {
    post_json("/local-api/set_hub_mode", json!({ "hub_mode": mode }))
}

pub fn build_set_schedule(schedule: &Schedule) -> HttpRequest {
    post_json("/local-api/set_schedule", json!({ "schedule": schedule }))
}

/// Parse the body of a status read. Absent fields decode to `None`; a body
/// that is not a JSON object of the expected shape is a schema mismatch.
pub fn parse_status(response: &HttpResponse) -> Result<Status> {
    check_success(response)?;
    serde_json::from_str(&response.body).map_err(|e| HubError::Schema(e.to_string()))
}

/// Parse the hub's acknowledgment of a write. The hub answers writes with an
/// empty 200; any echoed body is ignored.
pub fn parse_ack(response: &HttpResponse) -> Result<()> {
    check_success(response)
}

fn check_success(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(HubError::Device {
        status: response.status,
        body: response.body.clone(),
    })
}
