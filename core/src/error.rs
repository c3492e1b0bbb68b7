//! Error types for the hub client.
//!
//! # Design
//! Every failure mode a caller can observe has its own variant, and the retry
//! layer classifies them through [`HubError::is_transient`]: connection-level
//! failures and 5xx responses may succeed on a later attempt, everything else
//! is deterministic and retrying cannot change the outcome. `Device` carries
//! the hub's error payload verbatim for debugging.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HubError>;

/// Errors returned by hub operations.
#[derive(Debug, Error)]
pub enum HubError {
    /// A caller-supplied value fell outside the hub's accepted range.
    /// Raised by config type constructors before any network cost is paid.
    #[error("expected value {field} to be in range [{lower}, {upper}], but found {found}")]
    Validation {
        field: &'static str,
        lower: i64,
        upper: i64,
        found: i64,
    },

    /// Connection-level failure: DNS, refused, timeout. Retryable. The
    /// underlying error is kept as the cause chain.
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The hub answered with a non-2xx status. The body is preserved
    /// unmodified. 4xx responses are terminal; 5xx are retried.
    #[error("hub returned {status}: {body}")]
    Device { status: u16, body: String },

    /// A 2xx response body did not match the expected shape. Treated as a
    /// client/firmware version mismatch, not a transient fault.
    #[error("unexpected response shape: {0}")]
    Schema(String),

    /// An operation was attempted after the session was closed.
    #[error("session is closed")]
    SessionClosed,

    /// A transient failure persisted past the retry ceiling. Wraps the last
    /// transport or 5xx error observed.
    #[error("gave up after {attempts} attempts: {last}")]
    RetryExhausted { attempts: u32, last: Box<HubError> },
}

impl HubError {
    /// Wrap a connection-level failure, preserving the cause.
    pub(crate) fn transport<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HubError::Transport {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether a later attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            HubError::Transport { .. } => true,
            HubError::Device { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refused() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused")
    }

    #[test]
    fn transport_and_5xx_are_transient() {
        assert!(HubError::transport(refused()).is_transient());
        assert!(HubError::Device {
            status: 503,
            body: String::new()
        }
        .is_transient());
    }

    #[test]
    fn transport_keeps_the_cause_chain() {
        let err = HubError::transport(refused());
        assert_eq!(err.to_string(), "transport failure: connection refused");
        let source = std::error::Error::source(&err).expect("cause must survive");
        assert!(source.is::<std::io::Error>());
    }

    #[test]
    fn deterministic_failures_are_terminal() {
        let terminal = [
            HubError::Validation {
                field: "timezone",
                lower: -12,
                upper: 13,
                found: 99,
            },
            HubError::Device {
                status: 404,
                body: "{}".into(),
            },
            HubError::Schema("not json".into()),
            HubError::SessionClosed,
        ];
        for err in terminal {
            assert!(!err.is_transient(), "{err} should be terminal");
        }
    }

    #[test]
    fn validation_message_names_field_and_bounds() {
        let err = HubError::Validation {
            field: "timezone",
            lower: -12,
            upper: 13,
            found: 15,
        };
        assert_eq!(
            err.to_string(),
            "expected value timezone to be in range [-12, 13], but found 15"
        );
    }
}
