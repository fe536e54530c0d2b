//! Configuration loading from an optional TOML file and the environment.
//!
//! Precedence, lowest to highest: built-in defaults, config file,
//! environment variables. The API key is resolved per request by the
//! fetcher, so only the config-file value is captured here.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use metals_hex::inbound::{Environment, allowed_origins};
use metals_hex::service::DEFAULT_CACHE_SECONDS;
use metals_hex::{FetcherConfig, KeySource};
use metals_upstream::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

const DEFAULT_CONFIG_FILE: &str = "metals.toml";
const DEFAULT_PORT: u16 = 5080;
const DEFAULT_BASE_CURRENCY: &str = "USD";
const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Shape of the TOML config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub environment: Option<String>,
    pub server: ServerSection,
    pub metalprice_api: MetalpriceSection,
    pub cors: CorsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetalpriceSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub base_currency: Option<String>,
    pub cache_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsSection {
    pub allowed_origins: Vec<String>,
}

impl FileConfig {
    fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub base_url: String,
    pub upstream_timeout: Duration,
    pub fetcher: FetcherConfig,
    /// Resolved CORS origins (development default applied).
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Loads configuration from the config file and environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let env = |name: &str| std::env::var(name).ok();

        let file = match env("METALS_CONFIG") {
            Some(path) => FileConfig::read(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                FileConfig::read(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => FileConfig::default(),
        };

        Self::from_sources(file, env)
    }

    /// Merges a parsed config file with an environment lookup.
    pub fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let file_environment = file
            .environment
            .as_deref()
            .map(str::parse::<Environment>)
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid environment in config file: {e}"))?;
        let environment = setting(&env, "APP_ENV", file_environment, Environment::default())?;

        let port = setting(&env, "PORT", file.server.port, DEFAULT_PORT)?;

        let api = file.metalprice_api;
        let base_url: String = setting(
            &env,
            "METALPRICE_BASE_URL",
            api.base_url,
            DEFAULT_BASE_URL.to_string(),
        )?;
        let base_url = base_url.trim().to_string();
        if base_url.is_empty() {
            anyhow::bail!("METALPRICE_BASE_URL must not be blank");
        }

        let base_currency: String = setting(
            &env,
            "METALPRICE_BASE_CURRENCY",
            api.base_currency,
            DEFAULT_BASE_CURRENCY.to_string(),
        )?;
        let cache_seconds = setting(
            &env,
            "METALPRICE_CACHE_SECONDS",
            api.cache_seconds,
            DEFAULT_CACHE_SECONDS,
        )?;
        let timeout_seconds = setting(
            &env,
            "METALPRICE_TIMEOUT_SECONDS",
            api.timeout_seconds,
            DEFAULT_TIMEOUT.as_secs(),
        )?;
        if !(1..=MAX_TIMEOUT_SECONDS).contains(&timeout_seconds) {
            anyhow::bail!(
                "METALPRICE_TIMEOUT_SECONDS must be between 1 and {MAX_TIMEOUT_SECONDS}, got {timeout_seconds}"
            );
        }

        let fetcher = FetcherConfig::new(
            &base_currency,
            cache_seconds,
            KeySource::default_chain(api.api_key),
        )?;

        let configured_origins = match env("CORS_ALLOWED_ORIGINS") {
            Some(list) => list.split(',').map(String::from).collect(),
            None => file.cors.allowed_origins,
        };

        Ok(Self {
            port,
            environment,
            base_url,
            upstream_timeout: Duration::from_secs(timeout_seconds),
            fetcher,
            allowed_origins: allowed_origins(&configured_origins, environment),
        })
    }
}

/// Environment variable beats file value beats default.
fn setting<T>(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
    file_value: Option<T>,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env(name).filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {name}: {e}")),
        None => Ok(file_value.unwrap_or(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(toml: &str, vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let file: FileConfig = toml::from_str(toml)?;
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_sources(file, |name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load("", &[]).unwrap();
        assert_eq!(config.port, 5080);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.base_url, "https://api.metalpriceapi.com/v1");
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.fetcher.default_base_currency.as_str(), "USD");
        assert_eq!(config.fetcher.cache_ttl, Duration::from_secs(10));
        assert!(config.allowed_origins.is_empty());
        assert_eq!(
            config.fetcher.key_sources,
            vec![
                KeySource::Env("METALPRICE_API_KEY".into()),
                KeySource::Env("METALS_API_KEY".into()),
                KeySource::Configured(None),
            ]
        );
    }

    #[test]
    fn test_file_values() {
        let toml = r#"
            environment = "development"

            [server]
            port = 8080

            [metalprice_api]
            api_key = "file-key"
            base_url = "https://sandbox.example/v1"
            base_currency = "eur"
            cache_seconds = 30
            timeout_seconds = 5

            [cors]
            allowed_origins = ["https://prices.example.com"]
        "#;
        let config = load(toml, &[]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.base_url, "https://sandbox.example/v1");
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.fetcher.default_base_currency.as_str(), "EUR");
        assert_eq!(config.fetcher.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.allowed_origins, vec!["https://prices.example.com"]);
        assert_eq!(
            config.fetcher.key_sources.last(),
            Some(&KeySource::Configured(Some("file-key".into())))
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let toml = r#"
            [metalprice_api]
            cache_seconds = 30
        "#;
        let config = load(
            toml,
            &[
                ("METALPRICE_CACHE_SECONDS", "60"),
                ("PORT", "9000"),
                ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ],
        )
        .unwrap();

        assert_eq!(config.fetcher.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_development_gets_dev_origin() {
        let config = load("", &[("APP_ENV", "Development")]).unwrap();
        assert_eq!(config.allowed_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    fn test_rejects_out_of_range_ttl() {
        assert!(load("", &[("METALPRICE_CACHE_SECONDS", "0")]).is_err());
        assert!(load("", &[("METALPRICE_CACHE_SECONDS", "3601")]).is_err());
        assert!(load("", &[("METALPRICE_CACHE_SECONDS", "ten")]).is_err());
    }

    #[test]
    fn test_rejects_short_base_currency_and_blank_url() {
        assert!(load("", &[("METALPRICE_BASE_CURRENCY", "US")]).is_err());
        assert!(load("[metalprice_api]\nbase_url = \"  \"", &[]).is_err());
    }

    #[test]
    fn test_rejects_bad_timeout_and_environment() {
        assert!(load("", &[("METALPRICE_TIMEOUT_SECONDS", "0")]).is_err());
        assert!(load("", &[("APP_ENV", "staging")]).is_err());
    }

    #[test]
    fn test_rejects_unknown_file_keys() {
        assert!(toml::from_str::<FileConfig>("[metalprice_api]\napikey = \"typo\"").is_err());
    }
}
