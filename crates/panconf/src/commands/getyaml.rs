//! `panconf getyaml --all`: export every configured host.

use tracing::{info, warn};

use panconf_config::{Config, KeyringCredentials, Paths};
use panconf_core::{FailureKind, PanosConnector, RunReport, SchemaRegistry, run_all};

use crate::cli::{GetyamlArgs, GlobalOpts};
use crate::error::CliError;

pub async fn handle(
    args: &GetyamlArgs,
    global: &GlobalOpts,
    paths: &Paths,
    config: &Config,
) -> Result<(), CliError> {
    if !args.all {
        return Err(CliError::Usage {
            reason: "no export scope given".into(),
            hint: "Run: panconf getyaml --all [--force]".into(),
        });
    }

    // Setup: everything here is fatal.
    let candidates = paths.schema_candidates(args.schema.as_deref(), &config.settings);
    let schema_path = SchemaRegistry::locate(&candidates)?;
    let registry = SchemaRegistry::load(&schema_path)?;
    info!(schema = %schema_path.display(), "using schema");

    let config_path = paths.config_file().display().to_string();
    if config.hosts.is_empty() {
        return Err(CliError::NoHosts { path: config_path });
    }
    let hosts = config
        .host_specs(global.insecure, global.timeout)
        .map_err(|source| CliError::Config {
            path: config_path,
            source,
        })?;
    let options = config.run_options(paths, args.force);

    // Run: failures from here on are recovered and reported.
    let connector = PanosConnector::new(KeyringCredentials::new(config));
    let report = run_all(&connector, &registry, &hosts, &options).await;

    if !global.quiet {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    for failure in &report.failures {
        let scope = match (&failure.vsys, &failure.object_type) {
            (Some(vsys), Some(object_type)) => format!("{}/{vsys} {object_type}", failure.host),
            (Some(vsys), None) => format!("{}/{vsys}", failure.host),
            _ => failure.host.clone(),
        };
        let stage = match failure.kind {
            FailureKind::Connect => "connect",
            FailureKind::Extract => "extract",
            FailureKind::Write => "write",
        };
        eprintln!("✗ {scope}: {stage} failed: {}", failure.error);
    }

    eprintln!(
        "{} written, {} skipped (already present), {} empty, {} failed",
        report.written(),
        report.skipped(),
        report.empty(),
        report.failures.len()
    );
    if report.skipped() > 0 {
        warn!("existing files were kept; rerun with --force to overwrite them");
    }
}
