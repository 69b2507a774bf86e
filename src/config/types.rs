use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;

/// Environment variable pointing at an alternative YAML config file.
pub const CONFIG_PATH_ENV: &str = "BOOKSHELF_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: listener, token signing, user store and logging.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub jwt: JWTConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigV1 {
    /// The `host:port` pair the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Build the figment used to load configuration.
///
/// Later sources override earlier ones: defaults, the YAML file,
/// `BOOKSHELF_*` variables (`__` separates nesting levels), then the plain
/// `PORT` and `JWT_SECRET_KEY` variables.
pub fn config_figment(path: &str) -> Figment {
    Figment::new()
        .merge(Serialized::default("version", "1.0.0"))
        .merge(Yaml::file(path))
        .merge(
            Env::prefixed("BOOKSHELF_")
                .ignore(&["config"])
                .split("__"),
        )
        .merge(Env::raw().only(&["port"]))
        .merge(
            Env::raw()
                .only(&["jwt_secret_key"])
                .map(|_| "jwt.secret".into()),
        )
}

/// Extract a `ConfigV1` from any figment, resolving the version tag.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from `config.yaml` (or `$BOOKSHELF_CONFIG`) and the environment.
pub fn load_config() -> ConfigV1 {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match extract_config(&config_figment(&path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to render schema: {}", e),
    }
}

/// Token signing settings.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct JWTConfig {
    pub secret: String,
    #[serde(default = "default_iss")]
    pub iss: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_exp")]
    pub exp: i64,
}

fn default_iss() -> String {
    "bookshelf".to_string()
}

fn default_exp() -> i64 {
    2 * 60 * 60
}
