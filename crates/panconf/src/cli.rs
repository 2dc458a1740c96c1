//! Clap derive structures for the `panconf` CLI.
//!
//! Kept free of crate-internal imports: `build.rs` includes this file
//! directly to render man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// panconf -- export PAN-OS firewall configuration as YAML
#[derive(Debug, Parser)]
#[command(
    name = "panconf",
    version,
    about = "Export PAN-OS firewall configuration to YAML",
    long_about = "Reads the running configuration of every configured PAN-OS firewall\n\
        through the XML API and writes one YAML file per object type under\n\
        {config_root}/{host}/{vsys}/. Which objects are exported, and how,\n\
        is driven by the panos-schema.yml schema file.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory holding config.toml, the schema, and the default output tree
    #[arg(long, env = "PANCONF_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PANCONF_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "PANCONF_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export configuration to YAML files
    Getyaml(GetyamlArgs),

    /// Generate and store API keys
    Apikey(ApikeyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct GetyamlArgs {
    /// Export every object type of every configured host
    #[arg(long)]
    pub all: bool,

    /// Overwrite files that already exist
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Schema file (default: panos-schema.yml in the config directory)
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ApikeyArgs {
    /// Generate an API key for each host and store it in the system keyring
    #[arg(long)]
    pub set: bool,

    /// Replace keys that are already stored
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Only this host (default: every configured host)
    #[arg(long)]
    pub host: Option<String>,

    /// Administrator username (prompted when omitted)
    #[arg(long, short = 'u')]
    pub username: Option<String>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
