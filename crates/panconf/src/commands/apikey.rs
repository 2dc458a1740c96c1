//! `panconf apikey --set`: exchange admin credentials for API keys.

use dialoguer::Input;
use secrecy::SecretString;
use tracing::info;

use panconf_api::XmlApiClient;
use panconf_config::{Config, Paths};
use panconf_core::HostSpec;

use crate::cli::{ApikeyArgs, GlobalOpts};
use crate::error::CliError;

pub async fn handle(
    args: &ApikeyArgs,
    global: &GlobalOpts,
    paths: &Paths,
    config: &Config,
) -> Result<(), CliError> {
    if !args.set {
        return Err(CliError::Usage {
            reason: "no apikey action given".into(),
            hint: "Run: panconf apikey --set [--host NAME] [--force]".into(),
        });
    }

    let config_path = paths.config_file().display().to_string();
    let config_err = |source| CliError::Config {
        path: config_path.clone(),
        source,
    };

    let specs = config
        .host_specs(global.insecure, global.timeout)
        .map_err(config_err)?;
    let targets: Vec<&HostSpec> = match &args.host {
        Some(name) => {
            config.host(name).map_err(config_err)?;
            specs.iter().filter(|s| &s.hostname == name).collect()
        }
        None => specs.iter().collect(),
    };
    if targets.is_empty() {
        return Err(CliError::NoHosts { path: config_path });
    }

    // Prompt once; the same administrator usually manages every firewall.
    let mut credentials: Option<(String, SecretString)> = None;

    for spec in targets {
        if !args.force && panconf_config::stored_api_key(&spec.hostname).is_some() {
            eprintln!("• {}: key already stored (use --force to replace)", spec.hostname);
            continue;
        }

        let (username, password) = match &credentials {
            Some(creds) => creds.clone(),
            None => {
                let creds = prompt_credentials(args.username.as_deref())?;
                credentials = Some(creds.clone());
                creds
            }
        };

        let client = XmlApiClient::new(spec.url.clone(), &spec.transport())
            .map_err(|e| CliError::from_api(&spec.hostname, e))?;
        let key = client
            .generate_api_key(&username, &password)
            .await
            .map_err(|e| CliError::from_api(&spec.hostname, e))?;

        panconf_config::store_api_key(&spec.hostname, &key)?;
        info!(host = %spec.hostname, "API key stored");
        eprintln!("✓ {}: API key stored in system keyring", spec.hostname);
    }

    Ok(())
}

fn prompt_credentials(username: Option<&str>) -> Result<(String, SecretString), CliError> {
    let username = match username {
        Some(name) => name.to_owned(),
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text()?,
    };
    let password = rpassword::prompt_password("Password: ")?;
    Ok((username, SecretString::from(password)))
}
