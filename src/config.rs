use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default)]
    pub delegate_enabled: bool,
    #[serde(default = "default_delegate_path")]
    pub delegate_path: String,
}

fn default_delegate_path() -> String {
    "/internal/ai/assignments".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_skill_weight")]
    pub skill: f64,
    #[serde(default = "default_load_weight")]
    pub load: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            skill: default_skill_weight(),
            load: default_load_weight(),
        }
    }
}

fn default_skill_weight() -> f64 { 0.7 }
fn default_load_weight() -> f64 { 0.3 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with COLLAB_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with COLLAB_)
            // e.g., COLLAB_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("COLLAB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("COLLAB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known environment variable overrides for secrets
///
/// `JWT_SECRET` and `BACKEND_API_KEY` are the names the rest of the platform
/// uses, so they are honored alongside the `COLLAB_`-prefixed forms.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let jwt_secret = env::var("JWT_SECRET")
        .or_else(|_| env::var("COLLAB_AUTH__JWT_SECRET"))
        .ok();
    let backend_endpoint = env::var("BACKEND_URL")
        .or_else(|_| env::var("COLLAB_BACKEND__ENDPOINT"))
        .ok();
    let backend_api_key = env::var("BACKEND_API_KEY")
        .or_else(|_| env::var("COLLAB_BACKEND__API_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(secret) = jwt_secret {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }
    if let Some(endpoint) = backend_endpoint {
        builder = builder.set_override("backend.endpoint", endpoint)?;
    }
    if let Some(api_key) = backend_api_key {
        builder = builder.set_override("backend.api_key", api_key)?;
    }

    builder.build()
}
