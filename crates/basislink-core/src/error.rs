// ── Core error types ──
//
// Domain-facing errors from basislink-core. Consumers never see raw
// HTTP status codes or JSON parse failures directly; the
// `From<basislink_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach the Basis API: {reason}")]
    ConnectionFailed { reason: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    /// First refresh of a newly discovered board failed; its addition
    /// was aborted for this reconciliation pass.
    #[error("Setup of switchboard {serial} failed: {reason}")]
    BoardSetupFailed { serial: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<basislink_api::Error> for CoreError {
    fn from(err: basislink_api::Error) -> Self {
        match err {
            basislink_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            basislink_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                    }
                }
            }
            basislink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            basislink_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            basislink_api::Error::Api { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
            },
            basislink_api::Error::Graphql { message, path } => CoreError::Api {
                message: match path {
                    Some(path) => format!("{message} (at {path})"),
                    None => message,
                },
            },
            basislink_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("malformed response: {message}"),
            },
            basislink_api::Error::MissingData { what } => CoreError::Api {
                message: format!("response contained no {what}"),
            },
        }
    }
}
