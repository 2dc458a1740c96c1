//! Configuration for panconf.
//!
//! TOML config file (plus `PANCONF_*` environment overrides), the on-disk
//! path conventions, and API key resolution (env → keyring → plaintext).
//! Translates host entries into `panconf_core::HostSpec`s for the engine.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use panconf_core::{CredentialError, CredentialProvider, HostSpec, RunOptions, TlsVerification};

/// Keyring service name; entries are keyed `{hostname}/api-key`.
pub const KEYRING_SERVICE: &str = "panconf";
pub const CONFIG_FILE: &str = "config.toml";
pub const SCHEMA_FILE: &str = "panos-schema.yml";
pub const SCHEMA_DIST_FILE: &str = "panos-schema.yml.dist";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("host '{host}' is not configured")]
    UnknownHost { host: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    /// Firewalls to export, in run order.
    #[serde(default)]
    pub hosts: Vec<Host>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    /// Omit fields the device leaves unset instead of writing `null`.
    #[serde(default = "default_true")]
    pub skip_null_param: bool,

    #[serde(default = "default_true")]
    pub ssl_verify: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_parallel")]
    pub max_parallel_hosts: usize,

    pub schema_path: Option<PathBuf>,

    /// Output tree root. Defaults to `{config_dir}/hosts`.
    pub config_root: Option<PathBuf>,

    /// Directory for the daily-rotated log file. No file log when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skip_null_param: true,
            ssl_verify: true,
            timeout: default_timeout(),
            max_parallel_hosts: default_parallel(),
            schema_path: None,
            config_root: None,
            log_dir: None,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}
fn default_parallel() -> usize {
    1
}

/// One firewall.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Host {
    /// Management address; also the output directory name.
    pub hostname: String,

    /// API key (plaintext; prefer the keyring or an env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Virtual systems to export. Discovered when unset.
    pub vsys: Option<Vec<String>>,

    /// HTTPS port when not 443.
    pub port: Option<u16>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,
}

impl Host {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            api_key: None,
            api_key_env: None,
            vsys: None,
            port: None,
            ca_cert: None,
        }
    }

    /// `https://{hostname}[:{port}]`
    pub fn url(&self) -> Result<url::Url, ConfigError> {
        let raw = match self.port {
            Some(port) => format!("https://{}:{port}", self.hostname),
            None => format!("https://{}", self.hostname),
        };
        raw.parse().map_err(|_| ConfigError::Validation {
            field: "hostname".into(),
            reason: format!("cannot build a URL from '{}'", self.hostname),
        })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

/// Where panconf keeps its config, schema, and output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    config_dir: PathBuf,
}

impl Paths {
    /// Use `dir` when given, otherwise the platform config directory.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            config_dir: dir.unwrap_or_else(default_config_dir),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// The output tree root: the configured one, or `{config_dir}/hosts`.
    pub fn config_root(&self, settings: &Settings) -> PathBuf {
        settings
            .config_root
            .clone()
            .unwrap_or_else(|| self.config_dir.join("hosts"))
    }

    /// Schema files to try, most specific first.
    pub fn schema_candidates(&self, explicit: Option<&Path>, settings: &Settings) -> Vec<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .into_iter()
            .chain(settings.schema_path.clone())
            .chain([
                self.config_dir.join(SCHEMA_FILE),
                self.config_dir.join(SCHEMA_DIST_FILE),
            ])
            .collect()
    }
}

fn default_config_dir() -> PathBuf {
    ProjectDirs::from("com", "panconf", "panconf").map_or_else(dirs_fallback, |dirs| {
        dirs.config_dir().to_path_buf()
    })
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("panconf");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` + environment. A missing file yields defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PANCONF_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), hosts = config.hosts.len(), "config loaded");
    Ok(config)
}

impl Config {
    pub fn host(&self, hostname: &str) -> Result<&Host, ConfigError> {
        self.hosts
            .iter()
            .find(|h| h.hostname == hostname)
            .ok_or_else(|| ConfigError::UnknownHost {
                host: hostname.into(),
            })
    }

    /// Engine host specs. `insecure` and `timeout` are command-line overrides.
    pub fn host_specs(&self, insecure: bool, timeout: Option<u64>) -> Result<Vec<HostSpec>, ConfigError> {
        let timeout = Duration::from_secs(timeout.unwrap_or(self.settings.timeout));

        self.hosts
            .iter()
            .map(|host| {
                let tls = if insecure || !self.settings.ssl_verify {
                    TlsVerification::DangerAcceptInvalid
                } else if let Some(ref ca) = host.ca_cert {
                    TlsVerification::CustomCa(ca.clone())
                } else {
                    TlsVerification::SystemDefaults
                };

                let mut spec = HostSpec::new(host.hostname.as_str(), host.url()?);
                spec.vsys.clone_from(&host.vsys);
                spec.tls = tls;
                spec.timeout = timeout;
                Ok(spec)
            })
            .collect()
    }

    pub fn run_options(&self, paths: &Paths, force_overwrite: bool) -> RunOptions {
        let mut options = RunOptions::new(paths.config_root(&self.settings));
        options.force_overwrite = force_overwrite;
        options.drop_absent = self.settings.skip_null_param;
        options.max_parallel_hosts = self.settings.max_parallel_hosts.max(1);
        options
    }
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(hostname: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{hostname}/api-key"))
}

/// Resolve a host's API key from the credential chain.
pub fn resolve_api_key(host: &Host) -> Result<SecretString, CredentialError> {
    // 1. Host's api_key_env → env var lookup
    if let Some(ref env_name) = host.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Some(secret) = stored_api_key(&host.hostname) {
        return Ok(secret);
    }

    // 3. Plaintext in config
    if let Some(ref key) = host.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(CredentialError::NoCredentials {
        host: host.hostname.clone(),
    })
}

/// The key stored in the keyring for `hostname`, if any.
pub fn stored_api_key(hostname: &str) -> Option<SecretString> {
    keyring_entry(hostname)
        .and_then(|entry| entry.get_password())
        .ok()
        .map(SecretString::from)
}

/// Store an API key in the system keyring.
pub fn store_api_key(hostname: &str, key: &SecretString) -> Result<(), CredentialError> {
    keyring_entry(hostname)
        .and_then(|entry| entry.set_password(key.expose_secret()))
        .map_err(|e| CredentialError::Store {
            host: hostname.into(),
            reason: e.to_string(),
        })
}

/// `CredentialProvider` over the configured hosts.
pub struct KeyringCredentials {
    hosts: HashMap<String, Host>,
}

impl KeyringCredentials {
    pub fn new(config: &Config) -> Self {
        Self {
            hosts: config
                .hosts
                .iter()
                .map(|h| (h.hostname.clone(), h.clone()))
                .collect(),
        }
    }
}

impl CredentialProvider for KeyringCredentials {
    fn api_key(&self, spec: &HostSpec) -> Result<SecretString, CredentialError> {
        let host = self
            .hosts
            .get(&spec.hostname)
            .ok_or_else(|| CredentialError::NoCredentials {
                host: spec.hostname.clone(),
            })?;
        resolve_api_key(host)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(toml: &str) -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, toml).unwrap();
        load_config(&path).unwrap()
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert!(config.hosts.is_empty());
        assert!(config.settings.skip_null_param);
        assert!(config.settings.ssl_verify);
        assert_eq!(config.settings.timeout, 30);
        assert_eq!(config.settings.max_parallel_hosts, 1);
    }

    #[test]
    fn parses_settings_and_hosts() {
        let config = load(
            r#"
[settings]
skip_null_param = false
timeout = 10
max_parallel_hosts = 4

[[hosts]]
hostname = "fw01.example.net"
api_key_env = "FW01_KEY"

[[hosts]]
hostname = "fw02.example.net"
port = 8443
vsys = ["vsys1", "vsys2"]
"#,
        );

        assert!(!config.settings.skip_null_param);
        assert_eq!(config.settings.timeout, 10);
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.hosts[0].api_key_env.as_deref(), Some("FW01_KEY"));
        assert_eq!(
            config.host("fw02.example.net").unwrap().vsys,
            Some(vec!["vsys1".to_owned(), "vsys2".to_owned()])
        );
        assert!(matches!(
            config.host("fw03").unwrap_err(),
            ConfigError::UnknownHost { .. }
        ));
    }

    #[test]
    fn host_specs_apply_tls_and_overrides() {
        let config = load(
            r#"
[[hosts]]
hostname = "fw01.example.net"
ca_cert = "/etc/panconf/ca.pem"

[[hosts]]
hostname = "fw02.example.net"
port = 8443
"#,
        );

        let specs = config.host_specs(false, Some(5)).unwrap();
        assert_eq!(specs[0].url.as_str(), "https://fw01.example.net/");
        assert_eq!(
            specs[0].tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/panconf/ca.pem"))
        );
        assert_eq!(specs[1].url.as_str(), "https://fw02.example.net:8443/");
        assert_eq!(specs[1].tls, TlsVerification::SystemDefaults);
        assert_eq!(specs[1].timeout, Duration::from_secs(5));

        let insecure = config.host_specs(true, None).unwrap();
        assert!(insecure.iter().all(|s| s.tls == TlsVerification::DangerAcceptInvalid));
        assert_eq!(insecure[0].timeout, Duration::from_secs(30));
    }

    #[test]
    fn ssl_verify_off_accepts_any_certificate() {
        let config = load("[settings]\nssl_verify = false\n\n[[hosts]]\nhostname = \"fw01\"\n");
        let specs = config.host_specs(false, None).unwrap();
        assert_eq!(specs[0].tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn paths_and_run_options() {
        let paths = Paths::new(Some(PathBuf::from("/etc/panconf")));
        let mut config = Config::default();

        assert_eq!(paths.config_file(), PathBuf::from("/etc/panconf/config.toml"));
        assert_eq!(
            paths.schema_candidates(Some(Path::new("/tmp/s.yml")), &config.settings),
            [
                PathBuf::from("/tmp/s.yml"),
                PathBuf::from("/etc/panconf/panos-schema.yml"),
                PathBuf::from("/etc/panconf/panos-schema.yml.dist"),
            ]
        );

        let options = config.run_options(&paths, true);
        assert_eq!(options.config_root, PathBuf::from("/etc/panconf/hosts"));
        assert!(options.force_overwrite);
        assert!(options.drop_absent);

        config.settings.config_root = Some(PathBuf::from("/srv/backups"));
        config.settings.schema_path = Some(PathBuf::from("/srv/schema.yml"));
        assert_eq!(
            config.run_options(&paths, false).config_root,
            PathBuf::from("/srv/backups")
        );
        assert_eq!(
            paths.schema_candidates(None, &config.settings)[0],
            PathBuf::from("/srv/schema.yml")
        );
    }

    #[test]
    fn plaintext_key_is_the_last_resort() {
        let mut host = Host::new("panconf-test-no-such-host.invalid");
        host.api_key_env = Some("PANCONF_TEST_VARIABLE_THAT_IS_NOT_SET".into());
        host.api_key = Some("LUFRPT1-plain".into());

        let key = resolve_api_key(&host).unwrap();
        assert_eq!(key.expose_secret(), "LUFRPT1-plain");

        host.api_key = None;
        assert!(matches!(
            resolve_api_key(&host).unwrap_err(),
            CredentialError::NoCredentials { .. }
        ));
    }

    #[test]
    fn provider_rejects_unconfigured_host() {
        let provider = KeyringCredentials::new(&Config::default());
        let spec = HostSpec::new("fw09", "https://fw09".parse().unwrap());
        assert!(matches!(
            provider.api_key(&spec).unwrap_err(),
            CredentialError::NoCredentials { .. }
        ));
    }
}
