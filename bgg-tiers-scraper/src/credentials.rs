use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ScrapeError;

/// Environment variable holding the BoardGameGeek account name.
pub const USER_VAR: &str = "BGG_USER";
/// Environment variable holding the BoardGameGeek application token.
pub const API_KEY_VAR: &str = "BGG_API_KEY";

const TOKEN_URL: &str = "https://boardgamegeek.com/applications";

/// Credentials for querying the BoardGameGeek collection API.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("api_key", &mask_value(&self.api_key))
            .finish()
    }
}

/// Where a credential field's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from a process environment variable.
    EnvVar(&'static str),
    /// Loaded from the `.env` file in the project root.
    DotEnv,
    /// Loaded from the config file.
    ConfigFile,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::DotEnv => write!(f, ".env file"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each credential field.
#[derive(Debug)]
pub struct CredentialSources {
    pub user: CredentialSource,
    pub api_key: CredentialSource,
}

/// TOML config file format.
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
struct ConfigFile {
    bgg: Option<BggConfig>,
}

/// The `[bgg]` section of the credentials file.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct BggConfig {
    pub user: Option<String>,
    pub api_key: Option<String>,
}

/// Every place a credential may come from, highest priority first.
#[derive(Debug, Default)]
pub struct CredentialLayers {
    pub env: HashMap<String, String>,
    pub dotenv: HashMap<String, String>,
    pub config: Option<BggConfig>,
}

impl CredentialLayers {
    /// Read the process environment, `<root>/.env`, and the config file.
    pub fn gather(root: &Path) -> Self {
        let env = [USER_VAR, API_KEY_VAR]
            .into_iter()
            .filter_map(|var| std::env::var(var).ok().map(|v| (var.to_string(), v)))
            .collect();

        Self {
            env,
            dotenv: load_dotenv(&root.join(".env")),
            config: load_config_file(),
        }
    }

    fn resolve(
        &self,
        var: &'static str,
        from_config: fn(&BggConfig) -> Option<&String>,
    ) -> (Option<String>, CredentialSource) {
        if let Some(v) = non_empty(self.env.get(var)) {
            return (Some(v), CredentialSource::EnvVar(var));
        }
        if let Some(v) = non_empty(self.dotenv.get(var)) {
            return (Some(v), CredentialSource::DotEnv);
        }
        if let Some(v) = non_empty(self.config.as_ref().and_then(from_config)) {
            return (Some(v), CredentialSource::ConfigFile);
        }
        (None, CredentialSource::Missing)
    }

    fn user(&self) -> (Option<String>, CredentialSource) {
        self.resolve(USER_VAR, config_user)
    }

    fn api_key(&self) -> (Option<String>, CredentialSource) {
        self.resolve(API_KEY_VAR, config_api_key)
    }
}

fn config_user(config: &BggConfig) -> Option<&String> {
    config.user.as_ref()
}

fn config_api_key(config: &BggConfig) -> Option<&String> {
    config.api_key.as_ref()
}

impl Credentials {
    /// Load credentials for a project rooted at `root`.
    ///
    /// Priority: env vars > `<root>/.env` > config file. Both fields are required
    /// and an empty value counts as missing.
    pub fn load(root: &Path) -> Result<Self, ScrapeError> {
        Self::from_layers(&CredentialLayers::gather(root))
    }

    /// Resolve credentials from already-gathered layers.
    pub fn from_layers(layers: &CredentialLayers) -> Result<Self, ScrapeError> {
        let user = layers.user().0.ok_or_else(|| {
            ScrapeError::config(format!(
                "{USER_VAR} is not set. Set it in the environment, in the project .env file, or in {}",
                config_path_display()
            ))
        })?;

        let api_key = layers.api_key().0.ok_or_else(|| {
            ScrapeError::config(format!(
                "{API_KEY_VAR} is not set. Get a token from {TOKEN_URL} and set it in the environment, \
                 in the project .env file, or in {}",
                config_path_display()
            ))
        })?;

        Ok(Self { user, api_key })
    }
}

/// Determine where each credential field is coming from.
pub fn credential_sources(layers: &CredentialLayers) -> CredentialSources {
    CredentialSources {
        user: layers.user().1,
        api_key: layers.api_key().1,
    }
}

/// Return the path to the credentials config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bgg-tiers").join("credentials.toml"))
}

fn config_path_display() -> String {
    config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "the credentials config file".to_string())
}

/// Mask a secret for display, keeping the first two characters.
pub fn mask_value(s: &str) -> String {
    match s.char_indices().nth(2) {
        Some((idx, _)) => format!("{}****", &s[..idx]),
        None => "****".to_string(),
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read `KEY=value` pairs from a dotenv file without touching the process
/// environment. A missing file yields an empty map.
pub fn load_dotenv(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }
    match dotenv::from_path_iter(path) {
        Ok(iter) => iter
            .filter_map(|entry| match entry {
                Ok(pair) => Some(pair),
                Err(e) => {
                    log::warn!("Ignoring malformed line in {}: {}", path.display(), e);
                    None
                }
            })
            .collect(),
        Err(e) => {
            log::warn!("Could not read {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

/// Parse the credentials file contents.
pub fn parse_config(content: &str) -> Result<Option<BggConfig>, ScrapeError> {
    let config: ConfigFile = toml::from_str(content)
        .map_err(|e| ScrapeError::config(format!("Invalid credentials file: {}", e)))?;
    Ok(config.bgg)
}

fn load_config_file() -> Option<BggConfig> {
    let path = config_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    match parse_config(&content) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{} ({})", e, path.display());
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/credentials_tests.rs"]
mod tests;
