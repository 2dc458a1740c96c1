use thiserror::Error;

/// Top-level error type for the `panconf-api` crate.
///
/// Covers every failure mode of the XML API: authentication, transport,
/// the `<response status="error">` envelope, and XML decoding.
/// `panconf-core` maps these into per-host and per-subtree failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Key generation rejected the supplied username/password.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The API key was rejected by the device (HTTP 403 or error code 403).
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── XML API ─────────────────────────────────────────────────────
    /// `<response status="error">` from the device.
    #[error("PAN-OS API error{}: {message}", .code.map(|c| format!(" (code {c})")).unwrap_or_default())]
    Api { message: String, code: Option<u16> },

    /// Non-success HTTP status without a parseable error envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body was not well-formed XML, with a preview for debugging.
    #[error("XML decoding error: {message}")]
    Xml { message: String, body: String },

    /// The envelope was well-formed but lacked an expected element.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// PAN-OS error code for an xpath that matches nothing.
pub const NO_SUCH_NODE: u16 = 7;

impl Error {
    /// Returns `true` if the device rejected our credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::InvalidApiKey)
    }

    /// Returns `true` for an API error reporting a missing config node.
    pub fn is_no_such_node(&self) -> bool {
        matches!(self, Self::Api { code: Some(NO_SUCH_NODE), .. })
    }
}
