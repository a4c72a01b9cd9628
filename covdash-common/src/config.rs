//! Configuration loading and config file resolution

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::countries::eu_codes;
use crate::dataset::Dataset;
use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "COVDASH_CONFIG";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5730";
pub const DEFAULT_API_URL: &str = "https://covid-19-statistics.p.rapidapi.com";
pub const DEFAULT_API_HOST: &str = "covid-19-statistics.p.rapidapi.com";
pub const DEFAULT_CSV_PATH: &str = "data/covid_eu.csv";

/// Where the base table is loaded from
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// CSV export with one report per row
    Csv { path: PathBuf },
    /// Remote statistics API, one request per country
    Api {
        #[serde(default = "default_api_url")]
        url: String,
        #[serde(default = "default_api_host")]
        host: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "eu_codes")]
        countries: Vec<String>,
    },
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

impl SourceConfig {
    /// API source with defaults and the given key
    pub fn api(api_key: Option<String>) -> Self {
        SourceConfig::Api {
            url: default_api_url(),
            host: default_api_host(),
            api_key,
            countries: eu_codes(),
        }
    }

    /// Short description used in logs and `LoadInfo`
    pub fn describe(&self) -> String {
        match self {
            SourceConfig::Csv { path } => format!("csv:{}", path.display()),
            SourceConfig::Api { url, countries, .. } => {
                format!("api:{} ({} countries)", url, countries.len())
            }
        }
    }

    /// Load every report and build the base table
    pub async fn load(&self, reference_date: NaiveDate) -> Result<Dataset> {
        let source = self.describe();
        let dataset = match self {
            SourceConfig::Csv { path } => {
                Dataset::from_csv(crate::load::load_csv(path)?, &source, reference_date)
            }
            SourceConfig::Api {
                url,
                host,
                api_key,
                countries,
            } => {
                let key = api_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| Error::Config("API source requires an api_key".to_string()))?;
                let client = crate::load::ApiClient::new(url, host, key)?;
                let reports = client.fetch_reports(countries).await?;
                Dataset::from_reports(reports, &source, reference_date)
            }
        };
        Ok(dataset)
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    /// Reporting date used when the data carries none
    pub reference_date: Option<NaiveDate>,
    pub source: Option<SourceConfig>,
}

/// Overrides taken from the command line (and its env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub csv: Option<PathBuf>,
    pub api: bool,
    pub api_key: Option<String>,
    pub bind_addr: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub bind_addr: String,
    pub reference_date: NaiveDate,
    pub source: SourceConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            reference_date: Dataset::default_reference_date(),
            source: SourceConfig::Csv {
                path: PathBuf::from(DEFAULT_CSV_PATH),
            },
        }
    }
}

impl DashboardConfig {
    /// Fill unset TOML keys from compiled defaults
    pub fn from_toml(toml: TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: toml.bind_addr.unwrap_or(defaults.bind_addr),
            reference_date: toml.reference_date.unwrap_or(defaults.reference_date),
            source: toml.source.unwrap_or(defaults.source),
        }
    }

    /// Apply command-line overrides; `--csv` wins over `--api`
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(bind_addr) = overrides.bind_addr {
            self.bind_addr = bind_addr;
        }

        if let Some(path) = overrides.csv {
            self.source = SourceConfig::Csv { path };
        } else if overrides.api && !matches!(self.source, SourceConfig::Api { .. }) {
            self.source = SourceConfig::api(None);
        }

        if let (Some(key), SourceConfig::Api { api_key, .. }) = (overrides.api_key, &mut self.source) {
            *api_key = Some(key);
        }
        self
    }
}

/// Config file resolution, in priority order:
/// 1. Command-line argument
/// 2. `COVDASH_CONFIG` environment variable
/// 3. `<config_dir>/covdash/config.toml`, if it exists
///
/// Returns `None` when no config file applies.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("covdash").join("config.toml"))
        .filter(|p| p.exists())
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Resolve and load the configuration
///
/// A missing config file is not fatal: a warning is logged and compiled
/// defaults are used. A file that exists but does not parse is an error.
pub fn load_config(cli_arg: Option<&Path>, overrides: ConfigOverrides) -> Result<DashboardConfig> {
    let toml = match resolve_config_path(cli_arg) {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "Loading configuration");
            load_toml_config(&path)?
        }
        Some(path) => {
            warn!(path = %path.display(), "Config file not found, using defaults");
            TomlConfig::default()
        }
        None => {
            info!("No config file, using defaults");
            TomlConfig::default()
        }
    };

    Ok(DashboardConfig::from_toml(toml).apply(overrides))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_source() {
        let toml: TomlConfig = toml::from_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            reference_date = "2023-03-09"

            [source]
            kind = "csv"
            path = "/data/eu.csv"
            "#,
        )
        .unwrap();

        assert_eq!(toml.bind_addr.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(
            toml.source,
            Some(SourceConfig::Csv {
                path: PathBuf::from("/data/eu.csv")
            })
        );
    }

    #[test]
    fn test_parse_api_source_defaults() {
        let toml: TomlConfig = toml::from_str(
            r#"
            [source]
            kind = "api"
            api_key = "secret"
            "#,
        )
        .unwrap();

        match toml.source.unwrap() {
            SourceConfig::Api {
                url,
                host,
                api_key,
                countries,
            } => {
                assert_eq!(url, DEFAULT_API_URL);
                assert_eq!(host, DEFAULT_API_HOST);
                assert_eq!(api_key.as_deref(), Some("secret"));
                assert_eq!(countries.len(), 27);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_from_toml_fills_defaults() {
        let config = DashboardConfig::from_toml(TomlConfig::default());
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_overrides_csv_wins() {
        let config = DashboardConfig::default().apply(ConfigOverrides {
            csv: Some(PathBuf::from("x.csv")),
            api: true,
            api_key: Some("k".to_string()),
            bind_addr: Some("127.0.0.1:1".to_string()),
        });
        assert_eq!(config.bind_addr, "127.0.0.1:1");
        assert_eq!(
            config.source,
            SourceConfig::Csv {
                path: PathBuf::from("x.csv")
            }
        );
    }

    #[test]
    fn test_overrides_api_key() {
        let config = DashboardConfig::default().apply(ConfigOverrides {
            api: true,
            api_key: Some("k".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            config.source,
            SourceConfig::Api { api_key: Some(ref k), .. } if k == "k"
        ));
    }

    #[test]
    fn test_describe() {
        let csv = SourceConfig::Csv {
            path: PathBuf::from("a.csv"),
        };
        assert_eq!(csv.describe(), "csv:a.csv");
        assert!(SourceConfig::api(None).describe().contains("27 countries"));
    }
}
