//! Connection lifecycle and raw request execution.
//!
//! # Design
//! A `Session` owns the one connection pool for a hub's base address. The
//! pool sits behind a `tokio::sync::RwLock<Option<..>>`: concurrent sends
//! share the read lock (the pool reuses connections safely), while `close`
//! takes the write lock, so it waits for in-flight sends to finish and a
//! send can never observe a half-released pool. After close the slot is
//! `None` and every send fails with [`HubError::SessionClosed`].
//!
//! The session performs no retries of its own; that is the retry policy's
//! job one layer up.

use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{HubError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Per-request transport timeout. Also the only cancellation mechanism: an
/// abandoned call ends when the transport gives up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// An open connection to one hub.
pub struct Session {
    base_url: String,
    credential: Option<String>,
    pool: RwLock<Option<reqwest::Client>>,
}

impl Session {
    /// Establish a session against `base_url`, e.g. `http://cleverpet.local`.
    ///
    /// `credential`, when supplied, is passed through as a bearer
    /// `Authorization` header on every request; the session does not manage
    /// it beyond that. The caller must eventually invoke [`Session::close`]
    /// to release the pool.
    pub fn open(base_url: &str, credential: Option<&str>) -> Result<Self> {
        let pool = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(HubError::transport)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: credential.map(str::to_owned),
            pool: RwLock::new(Some(pool)),
        })
    }

    /// Execute one request and return the raw response.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let guard = self.pool.read().await;
        let pool = guard.as_ref().ok_or(HubError::SessionClosed)?;

        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };
        debug!(%url, method = ?request.method, "sending request");

        let mut builder = pool.request(method, &url);
        if let Some(token) = &self.credential {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(HubError::transport)?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(HubError::transport)?;
        Ok(HttpResponse { status, body })
    }

    /// Release the connection pool. Idempotent; a second close is a no-op.
    pub async fn close(&self) {
        self.pool.write().await.take();
    }

    pub async fn is_open(&self) -> bool {
        self.pool.read().await.is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential.as_deref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[tokio::test]
    async fn close_is_idempotent() {
        let session = Session::open("http://127.0.0.1:1", None).unwrap();
        assert!(session.is_open().await);
        session.close().await;
        session.close().await;
        assert!(!session.is_open().await);
    }

    #[tokio::test]
    async fn send_after_close_fails_without_touching_the_network() {
        let session = Session::open("http://127.0.0.1:1", None).unwrap();
        session.close().await;
        let err = session.send(&codec::build_status()).await.unwrap_err();
        assert!(matches!(err, HubError::SessionClosed));
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_stripped() {
        let session = Session::open("http://127.0.0.1:1/", None).unwrap();
        assert_eq!(session.base_url, "http://127.0.0.1:1");
    }
}
