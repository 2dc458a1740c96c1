// ── Runtime configuration ──
//
// Resolved, per-run settings handed to the engine. The CLI builds these
// from the on-disk config file; nothing here touches the filesystem.

use std::path::PathBuf;
use std::time::Duration;

use panconf_api::{TlsMode, TransportConfig};
use url::Url;

/// TLS verification for a host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Verify against the system trust store.
    #[default]
    SystemDefaults,
    /// Verify against a custom CA certificate (PEM).
    CustomCa(PathBuf),
    /// Accept any certificate. Appliances ship self-signed certs.
    DangerAcceptInvalid,
}

/// One firewall to export.
#[derive(Debug, Clone)]
pub struct HostSpec {
    /// Display name; also the first directory level of the output tree.
    pub hostname: String,
    pub url: Url,
    /// Explicit virtual systems. `None` means discover them.
    pub vsys: Option<Vec<String>>,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl HostSpec {
    /// A host reachable at `https://{hostname}` with default settings.
    pub fn new(hostname: impl Into<String>, url: Url) -> Self {
        Self {
            hostname: hostname.into(),
            url,
            vsys: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// HTTP transport settings for this host.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}

/// Options for a whole `getyaml --all` run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root of the output tree: `{config_root}/{host}/{vsys}/{module}_{type}.yml`.
    pub config_root: PathBuf,
    /// Replace existing files instead of skipping them.
    pub force_overwrite: bool,
    /// Omit absent fields rather than writing `null`.
    pub drop_absent: bool,
    /// Hosts processed concurrently. Output is reported in host order regardless.
    pub max_parallel_hosts: usize,
}

impl RunOptions {
    pub fn new(config_root: impl Into<PathBuf>) -> Self {
        Self {
            config_root: config_root.into(),
            force_overwrite: false,
            drop_absent: true,
            max_parallel_hosts: 1,
        }
    }
}
