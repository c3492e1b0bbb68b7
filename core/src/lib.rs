//! Typed async client for a smart pet-feeder hub's local HTTP API.
//!
//! # Overview
//! Reads the hub's status and writes its operational parameters (game level,
//! daily treat cap, DST flag, timezone offset, hub mode, weekday/weekend
//! schedule) over JSON-over-HTTP against a single base address.
//!
//! # Design
//! - Every settable field is a distinct value type validated at
//!   construction, so invalid values are rejected before any network cost.
//! - The codec builds and parses wire shapes as pure functions; the session
//!   owns the connection pool and open/closed lifecycle; the retry policy
//!   wraps each send with bounded exponential backoff for transient
//!   failures only.
//! - [`Hub`] composes the three per operation and is a cheap cloneable
//!   handle, safe for concurrent use from multiple tasks.
//!
//! ```no_run
//! use pethub_core::{Game, Hub};
//!
//! # async fn example() -> pethub_core::Result<()> {
//! Hub::scoped("http://cleverpet.local", None, |hub| async move {
//!     let status = hub.status().await?;
//!     println!("playing: {:?}", status.game);
//!     hub.set_game(Game::Game4).await
//! })
//! .await
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod http;
pub mod retry;
pub mod session;
pub mod types;

pub use client::Hub;
pub use error::{HubError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use retry::RetryPolicy;
pub use session::Session;
pub use types::{
    Game, HubMode, HubReport, HubState, MaxKibbles, Schedule, ScheduleTime, Status,
    TimezoneOffset, Window,
};
