use thiserror::Error;

/// Top-level error type for the `basislink-api` crate.
///
/// Covers every failure mode of the GraphQL surface: token acquisition,
/// HTTP transport, endpoint-level errors, and response decoding.
/// `basislink-core` maps these into domain-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token acquisition or refresh failed, or the endpoint returned 401.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Endpoint ────────────────────────────────────────────────────
    /// Non-success HTTP status from the GraphQL endpoint.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Error reported inside the GraphQL response envelope.
    #[error("GraphQL error: {message}")]
    Graphql {
        message: String,
        path: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// Response decoding failed, with the raw body for debugging.
    ///
    /// Only raised when a field required to identify an entity (a serial)
    /// is absent or the body is not the expected shape -- optional fields
    /// decode to defaults instead.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Success envelope with a null `data` root.
    #[error("Response contained no {what}")]
    MissingData { what: &'static str },
}

impl Error {
    /// Returns `true` if re-acquiring a token might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next scheduled poll.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
