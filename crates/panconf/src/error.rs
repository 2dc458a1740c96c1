//! CLI error types with miette diagnostics.
//!
//! Only setup failures surface here: a run that recovered from per-host or
//! per-object-type failures still exits successfully.

use miette::Diagnostic;
use thiserror::Error;

use panconf_config::ConfigError;
use panconf_core::{CredentialError, SchemaError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONFIG: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid configuration: {source}")]
    #[diagnostic(
        code(panconf::config),
        help("Check the config file at {path}")
    )]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("No hosts configured")]
    #[diagnostic(
        code(panconf::no_hosts),
        help(
            "Add at least one [[hosts]] entry to {path}, e.g.\n\n\
             [[hosts]]\n\
             hostname = \"fw01.example.net\""
        )
    )]
    NoHosts { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(panconf::schema),
        help(
            "Copy schema/panos-schema.yml.dist into the config directory,\n\
             or point --schema at a schema file."
        )
    )]
    Schema(#[from] SchemaError),

    // ── Credentials ──────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(panconf::credentials),
        help("Generate and store a key with: panconf apikey --set")
    )]
    Credential(#[from] CredentialError),

    #[error("Authentication failed for {host}")]
    #[diagnostic(
        code(panconf::auth_failed),
        help("Verify the administrator username and password.")
    )]
    AuthFailed { host: String },

    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach {host}")]
    #[diagnostic(
        code(panconf::connection_failed),
        help(
            "Check that the management interface is reachable.\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert for the host."
        )
    )]
    ConnectionFailed {
        host: String,
        #[source]
        source: panconf_api::Error,
    },

    // ── Usage ────────────────────────────────────────────────────────

    #[error("Nothing to do: {reason}")]
    #[diagnostic(code(panconf::usage), help("{hint}"))]
    Usage { reason: String, hint: String },

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(panconf::prompt))]
    Prompt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::NoHosts { .. } | Self::Schema(_) => exit_code::CONFIG,
            Self::Credential(_) | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Usage { .. } => exit_code::USAGE,
            Self::Prompt(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    pub fn from_api(host: &str, err: panconf_api::Error) -> Self {
        if err.is_auth_failure() {
            Self::AuthFailed { host: host.into() }
        } else {
            Self::ConnectionFailed {
                host: host.into(),
                source: err,
            }
        }
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}
