//! Schema-driven extraction engine between `panconf-api` and the CLI.
//!
//! This crate owns everything with real invariants in panconf:
//!
//! - **[`SchemaRegistry`]**: The declarative description of which object
//!   types to export, loaded once from YAML and validated eagerly against
//!   the compile-time [`catalog`] of known PAN-OS types.
//!
//! - **[`extract()`]**: Walks a live device's object tree for one
//!   [`SchemaEntry`], recursing into declared child types depth-first, and
//!   returns normalized, deterministically ordered [`Record`]s.
//!
//! - **[`DeviceClient`]**: The seam to the appliance. [`PanosDevice`] speaks
//!   the XML API; tests plug in an in-memory device.
//!
//! - **[`writer`]**: Persists one [`ConfigUnit`] per file and never clobbers
//!   an existing file unless forced.
//!
//! - **[`run_all()`]**: Drives every configured host and virtual system,
//!   recovering from per-host and per-object-type failures and reporting
//!   them in a [`RunReport`].

pub mod catalog;
pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod order;
pub mod panos;
pub mod record;
pub mod run;
pub mod schema;
pub mod writer;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Location, TypeDescriptor};
pub use config::{HostSpec, RunOptions, TlsVerification};
pub use context::{Container, HostContext};
pub use device::{DeviceClient, Instance, Parent};
pub use error::{ConnectError, CredentialError, DeviceError, ExtractError, SchemaError, WriteError};
pub use extract::extract;
pub use normalize::normalize;
pub use order::order;
pub use panos::{CredentialProvider, PanosConnector, PanosDevice};
pub use record::{Record, Value};
pub use run::{Connector, Failure, FailureKind, RunReport, UnitOutcome, run_all};
pub use schema::{SchemaEntry, SchemaRegistry, SortKey};
pub use writer::{ConfigUnit, WriteOutcome, write_unit};
