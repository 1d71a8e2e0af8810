use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use bgg_tiers_scraper::credentials::{API_KEY_VAR, USER_VAR};
use bgg_tiers_scraper::{CredentialLayers, CredentialSource, mask_value};

use crate::error::CliError;

/// Show current credentials and their sources.
pub(crate) fn run_config_show(root: &Path) -> Result<(), CliError> {
    let layers = CredentialLayers::gather(root);
    let sources = bgg_tiers_scraper::credential_sources(&layers);

    log::info!(
        "{}",
        "BoardGameGeek Configuration".if_supports_color(Stderr, |t| t.bold()),
    );
    log::info!("");

    match bgg_tiers_scraper::config_path() {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stderr, |t| t.cyan()),
                "(exists)".if_supports_color(Stderr, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stderr, |t| t.cyan()),
                "(not found)".if_supports_color(Stderr, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stderr, |t| t.red()),
            );
        }
    }
    log::info!(
        "  .env file:   {}",
        root.join(".env")
            .display()
            .if_supports_color(Stderr, |t| t.cyan()),
    );
    log::info!("");

    let fields = [
        ("user", USER_VAR, &sources.user, false),
        ("api_key", API_KEY_VAR, &sources.api_key, true),
    ];

    for (name, var, source, is_secret) in fields {
        let value = source_value(&layers, var, source, name);
        let source_str = format!("({})", source);
        match value {
            Some(v) => {
                let shown = if is_secret { mask_value(&v) } else { v };
                log::info!(
                    "  {:<8} {} {}",
                    name,
                    shown,
                    source_str.if_supports_color(Stderr, |t| t.dimmed()),
                );
            }
            None => {
                log::info!(
                    "  {:<8} {}",
                    name,
                    "not set".if_supports_color(Stderr, |t| t.yellow()),
                );
            }
        }
    }

    Ok(())
}

/// Look up the raw value of a field in the layer its source points at.
fn source_value(
    layers: &CredentialLayers,
    var: &str,
    source: &CredentialSource,
    field: &str,
) -> Option<String> {
    match source {
        CredentialSource::EnvVar(_) => layers.env.get(var).cloned(),
        CredentialSource::DotEnv => layers.dotenv.get(var).cloned(),
        CredentialSource::ConfigFile => layers.config.as_ref().and_then(|c| match field {
            "user" => c.user.clone(),
            _ => c.api_key.clone(),
        }),
        CredentialSource::Missing => None,
    }
}

/// Print the config file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    let path = bgg_tiers_scraper::config_path()
        .ok_or_else(|| CliError::config("Could not determine config directory"))?;
    println!("{}", path.display());
    Ok(())
}
