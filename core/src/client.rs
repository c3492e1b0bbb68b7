//! The public hub client.
//!
//! # Design
//! Every operation follows the same pipeline: the typed argument is already
//! validated by construction, the codec builds the request, the session
//! executes it under the retry policy (5xx responses are classified
//! transient before decoding), and the codec parses the outcome. Writes are
//! full-value replaces on the hub side, so retrying them blindly is safe.
//!
//! `Hub` is a cheap handle — clones share the session — so concurrent
//! operations can be issued from multiple tasks against one open session.

use std::future::Future;
use std::sync::Arc;

use crate::codec;
use crate::error::{HubError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::retry::RetryPolicy;
use crate::session::Session;
use crate::types::{Game, HubMode, MaxKibbles, Schedule, Status, TimezoneOffset};

/// Async client for one pet-feeder hub.
#[derive(Debug, Clone)]
pub struct Hub {
    session: Arc<Session>,
    retry: RetryPolicy,
}

impl Hub {
    /// Open a client session against the hub at `base_url` with the default
    /// retry policy. The caller must eventually call [`Hub::close`]; prefer
    /// [`Hub::scoped`] when the client's lifetime fits one scope.
    pub fn open(base_url: &str, credential: Option<&str>) -> Result<Self> {
        Ok(Self {
            session: Arc::new(Session::open(base_url, credential)?),
            retry: RetryPolicy::default(),
        })
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Open a session, run `f`, and close on every exit path — including
    /// when `f` fails. If `f` panics, `close` is skipped and the pool is
    /// instead reclaimed when the last clone of the handle drops. For
    /// long-lived clients use [`Hub::open`]/[`Hub::close`] directly.
    pub async fn scoped<T, F, Fut>(base_url: &str, credential: Option<&str>, f: F) -> Result<T>
    where
        F: FnOnce(Hub) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let hub = Hub::open(base_url, credential)?;
        let result = f(hub.clone()).await;
        hub.close().await;
        result
    }

    /// Retrieve the hub's current status snapshot.
    pub async fn status(&self) -> Result<Status> {
        let response = self.dispatch(codec::build_status()).await?;
        codec::parse_status(&response)
    }

    /// Select the game level the hub plays. The change is staged and takes
    /// effect at the next round.
    pub async fn set_game(&self, game: Game) -> Result<()> {
        let response = self.dispatch(codec::build_set_game(game)).await?;
        codec::parse_ack(&response)
    }

    /// Set the daily treat cap.
    pub async fn set_max_kibbles(&self, max_kibbles: MaxKibbles) -> Result<()> {
        let response = self.dispatch(codec::build_set_max_kibbles(max_kibbles)).await?;
        codec::parse_ack(&response)
    }

    /// Enable or disable the daylight-saving adjustment.
    pub async fn set_dst(&self, dst_on: bool) -> Result<()> {
        let response = self.dispatch(codec::build_set_dst(dst_on)).await?;
        codec::parse_ack(&response)
    }

    /// Set the hub's UTC offset.
    pub async fn set_timezone(&self, offset: TimezoneOffset) -> Result<()> {
        let response = self.dispatch(codec::build_set_timezone(offset)).await?;
        codec::parse_ack(&response)
    }

    /// Set the rule governing when the hub is active.
    pub async fn set_hub_mode(&self, mode: HubMode) -> Result<()> {
        let response = self.dispatch(codec::build_set_hub_mode(mode)).await?;
        codec::parse_ack(&response)
    }

    /// Set the weekday/weekend activity windows.
    ///
    /// Accepted in any hub mode: the hub stores the schedule inertly and it
    /// governs activity only while the mode is [`HubMode::Scheduled`].
    pub async fn set_schedule(&self, schedule: &Schedule) -> Result<()> {
        let response = self.dispatch(codec::build_set_schedule(schedule)).await?;
        codec::parse_ack(&response)
    }

    /// Close the session. Idempotent; subsequent operations fail with
    /// [`HubError::SessionClosed`]. Affects all clones of this handle.
    pub async fn close(&self) {
        self.session.close().await;
    }

    /// One send under the retry policy. A 5xx response is promoted to an
    /// error here so the policy can classify it; anything below 500 is
    /// returned for the codec to interpret.
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.retry.run(|| self.attempt(&request)).await
    }

    async fn attempt(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self.session.send(request).await?;
        if response.status >= 500 {
            return Err(HubError::Device {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }
}
