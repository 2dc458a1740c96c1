// ── Run orchestrator ──
//
// Drives a full export: every host, every virtual system, every top-level
// schema entry. Failures are recovered at the host and object-type
// boundaries and collected into the `RunReport`.

use std::future::Future;
use std::path::Path;

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{error, info, warn};

use crate::config::{HostSpec, RunOptions};
use crate::context::HostContext;
use crate::device::DeviceClient;
use crate::error::ConnectError;
use crate::extract::extract;
use crate::schema::SchemaRegistry;
use crate::writer::{ConfigUnit, WriteOutcome, write_unit};

const DEFAULT_VSYS: &str = "vsys1";
/// Previously exported vsys list used for discovery.
const VSYS_EXPORT: &str = "device_vsys.yml";

/// Opens device sessions.
pub trait Connector: Send + Sync {
    type Client: DeviceClient;

    /// Connect to `host`. `vsys` selects a virtual system; `None` uses the default.
    fn connect(
        &self,
        host: &HostSpec,
        vsys: Option<&str>,
    ) -> impl Future<Output = Result<Self::Client, ConnectError>> + Send;
}

/// What happened to one config unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    pub host: String,
    pub vsys: String,
    pub object_type: String,
    /// `None` when extraction found no instances and nothing was written.
    pub write: Option<WriteOutcome>,
}

/// Which boundary a failure was recovered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connect,
    Extract,
    Write,
}

/// A recovered failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub host: String,
    pub vsys: Option<String>,
    pub object_type: Option<String>,
    pub kind: FailureKind,
    pub error: String,
}

/// Summary of a full run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub units: Vec<UnitOutcome>,
    pub failures: Vec<Failure>,
}

impl RunReport {
    pub fn written(&self) -> usize {
        self.count(Some(WriteOutcome::Written))
    }

    pub fn skipped(&self) -> usize {
        self.count(Some(WriteOutcome::Skipped))
    }

    pub fn empty(&self) -> usize {
        self.count(None)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn count(&self, outcome: Option<WriteOutcome>) -> usize {
        self.units.iter().filter(|u| u.write == outcome).count()
    }

    fn merge(&mut self, other: RunReport) {
        self.units.extend(other.units);
        self.failures.extend(other.failures);
    }
}

/// Export every host.
///
/// Hosts run with at most `options.max_parallel_hosts` in flight; the
/// report lists hosts in input order.
pub async fn run_all<K: Connector>(
    connector: &K,
    registry: &SchemaRegistry,
    hosts: &[HostSpec],
    options: &RunOptions,
) -> RunReport {
    let parallel = options.max_parallel_hosts.max(1);

    let reports: Vec<RunReport> = stream::iter(hosts)
        .map(|host| run_host(connector, registry, host, options))
        .buffered(parallel)
        .collect()
        .await;

    let mut report = RunReport::default();
    for host_report in reports {
        report.merge(host_report);
    }

    info!(
        written = report.written(),
        skipped = report.skipped(),
        empty = report.empty(),
        failures = report.failures.len(),
        "run complete"
    );
    report
}

async fn run_host<K: Connector>(
    connector: &K,
    registry: &SchemaRegistry,
    host: &HostSpec,
    options: &RunOptions,
) -> RunReport {
    let mut report = RunReport::default();
    let vsys_list = discover_vsys(host, &options.config_root);
    let single = vsys_list.len() == 1 && vsys_list[0] == DEFAULT_VSYS;

    for vsys in &vsys_list {
        let selector = (!single).then_some(vsys.as_str());
        let client = match connector.connect(host, selector).await {
            Ok(client) => client,
            Err(e) => {
                warn!(host = %host.hostname, vsys = %vsys, error = %e, "connection failed, skipping");
                report.failures.push(Failure {
                    host: host.hostname.clone(),
                    vsys: Some(vsys.clone()),
                    object_type: None,
                    kind: FailureKind::Connect,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let ctx = HostContext::new(host.hostname.as_str(), vsys.as_str(), client)
            .with_drop_absent(options.drop_absent);
        run_vsys(&ctx, registry, options, &mut report).await;
    }

    report
}

async fn run_vsys<C: DeviceClient>(
    ctx: &HostContext<C>,
    registry: &SchemaRegistry,
    options: &RunOptions,
    report: &mut RunReport,
) {
    for (module, entry) in registry.top_level() {
        if entry.skip {
            continue;
        }
        let object_type = format!("{module}/{}", entry.name);

        let records = match extract(ctx, entry).await {
            Ok(records) => records,
            Err(e) => {
                if e.is_contract_violation() {
                    error!(host = %ctx.host, vsys = %ctx.vsys, %object_type, error = %e, "schema contract violated");
                } else {
                    warn!(host = %ctx.host, vsys = %ctx.vsys, %object_type, error = %e, "extraction failed");
                }
                report.failures.push(Failure {
                    host: ctx.host.clone(),
                    vsys: Some(ctx.vsys.clone()),
                    object_type: Some(object_type),
                    kind: FailureKind::Extract,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if records.is_empty() {
            report.units.push(UnitOutcome {
                host: ctx.host.clone(),
                vsys: ctx.vsys.clone(),
                object_type,
                write: None,
            });
            continue;
        }

        let unit = ConfigUnit::new(ctx.host.as_str(), ctx.vsys.as_str(), module, &entry.name, records);
        let path = unit.path(&options.config_root);
        match write_unit(&path, &unit.records, options.force_overwrite) {
            Ok(outcome) => {
                if outcome == WriteOutcome::Written {
                    info!(host = %ctx.host, vsys = %ctx.vsys, %object_type, path = %path.display(), "wrote config");
                }
                report.units.push(UnitOutcome {
                    host: ctx.host.clone(),
                    vsys: ctx.vsys.clone(),
                    object_type,
                    write: Some(outcome),
                });
            }
            Err(e) => {
                warn!(host = %ctx.host, vsys = %ctx.vsys, %object_type, error = %e, "write failed");
                report.failures.push(Failure {
                    host: ctx.host.clone(),
                    vsys: Some(ctx.vsys.clone()),
                    object_type: Some(object_type),
                    kind: FailureKind::Write,
                    error: e.to_string(),
                });
            }
        }
    }
}

// ── Virtual-system discovery ────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ExportedVsys {
    name: Option<String>,
}

/// The virtual systems to export for `host`.
///
/// An explicit list wins; otherwise the names from a previous
/// `device_vsys.yml` export; otherwise just `vsys1`.
pub fn discover_vsys(host: &HostSpec, config_root: &Path) -> Vec<String> {
    if let Some(list) = host.vsys.as_ref().filter(|list| !list.is_empty()) {
        return list.clone();
    }

    let path = config_root
        .join(&host.hostname)
        .join(DEFAULT_VSYS)
        .join(VSYS_EXPORT);
    let names = std::fs::read_to_string(&path)
        .ok()
        .and_then(|text| match serde_yaml::from_str::<Vec<ExportedVsys>>(&text) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable vsys export, using vsys1");
                None
            }
        })
        .map(|entries| entries.into_iter().filter_map(|e| e.name).collect::<Vec<_>>())
        .unwrap_or_default();

    if names.is_empty() {
        vec![DEFAULT_VSYS.to_owned()]
    } else {
        names
    }
}
