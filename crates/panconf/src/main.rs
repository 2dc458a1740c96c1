mod cli;
mod commands;
mod error;

use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use panconf_config::{Config, Paths};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(args) = &cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(args.shell, &mut cmd, "panconf", &mut std::io::stdout());
        return;
    }

    let paths = Paths::new(cli.global.config_dir.clone());
    let config = panconf_config::load_config(&paths.config_file()).map_err(|source| {
        CliError::Config {
            path: paths.config_file().display().to_string(),
            source,
        }
    });

    // The file log needs `log_dir` from the config; keep the guard alive
    // until exit so buffered lines are flushed.
    let log_dir = config.as_ref().ok().and_then(|c| c.settings.log_dir.clone());
    let _guard = init_tracing(&cli.global, log_dir.as_deref());

    let result = match config {
        Ok(config) => run(cli, &paths, &config).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(global: &GlobalOpts, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = if global.quiet {
        "error"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Daily-rotated file log alongside stderr.
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "panconf.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    guard
}

async fn run(cli: Cli, paths: &Paths, config: &Config) -> Result<(), CliError> {
    match cli.command {
        Command::Getyaml(args) => commands::getyaml::handle(&args, &cli.global, paths, config).await,
        Command::Apikey(args) => commands::apikey::handle(&args, &cli.global, paths, config).await,
        // Handled before the config is loaded.
        Command::Completions(_) => Ok(()),
    }
}
