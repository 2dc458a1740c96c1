// ── Core error types ──
//
// One enum per recovery boundary:
// - `SchemaError`: setup, fatal before any host is touched
// - `ConnectError` / `CredentialError`: per host, the host is skipped
// - `ExtractError` / `DeviceError`: per top-level object type, siblings continue
// - `WriteError`: per config unit

use std::path::PathBuf;

use thiserror::Error;

use crate::context::Container;

/// Schema loading and lookup failures.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no schema file found (searched: {searched})")]
    NotFound { searched: String },

    #[error("failed to read schema {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed schema: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid schema entry '{entry}': {reason}")]
    Invalid { entry: String, reason: String },

    #[error("unknown object type '{name}'")]
    UnknownType { name: String },
}

/// A single device query failed.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error(transparent)]
    Api(#[from] panconf_api::Error),

    #[error("{object_type} cannot be read from the {container} container")]
    Placement {
        object_type: &'static str,
        container: Container,
    },
}

/// Extraction of one object type (and its subtree) failed.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{object_type}: parent relation '{relation}' is not defined for this host")]
    ParentUnresolved { object_type: String, relation: String },

    #[error("{object_type}: fetch failed: {source}")]
    Fetch {
        object_type: String,
        #[source]
        source: DeviceError,
    },

    #[error("{object_type}: sort key '{key}' missing from a normalized record")]
    SortKeyMissing { object_type: String, key: String },
}

impl ExtractError {
    /// Data-contract violations are schema defects rather than device conditions.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::SortKeyMissing { .. })
    }
}

/// Credential resolution failed for a host.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no API key configured for host '{host}'")]
    NoCredentials { host: String },

    #[error("credential store error for host '{host}': {reason}")]
    Store { host: String, reason: String },
}

/// Opening a device session failed.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("cannot connect to {url}: {source}")]
    Api {
        url: String,
        #[source]
        source: panconf_api::Error,
    },
}

/// Persisting a config unit failed.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
