//! CLI configuration: file, then environment, then flags.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storefront_observability::LogFormat;
use storefront_products::CombinationLimit;

/// Overrides `generator.max_combinations`.
pub const ENV_MAX_COMBINATIONS: &str = "STOREFRONT_MAX_COMBINATIONS";

/// Overrides `logging.format`.
pub const ENV_LOG_FORMAT: &str = "STOREFRONT_LOG_FORMAT";

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Variant generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Ceiling on combinations per generation (default: 100).
    #[serde(default)]
    pub max_combinations: CombinationLimit,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl CliConfig {
    /// Load config from a TOML or JSON file (chosen by extension).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_COMBINATIONS) {
            let limit = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{ENV_MAX_COMBINATIONS} must be an integer, got `{raw}`"))?;
            self.generator.max_combinations = CombinationLimit::new(limit)
                .with_context(|| format!("invalid {ENV_MAX_COMBINATIONS}"))?;
        }

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = raw
                .parse::<LogFormat>()
                .with_context(|| format!("invalid {ENV_LOG_FORMAT}"))?;
        }

        Ok(self)
    }

    /// File (if given) + process environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_generator() {
        let config = CliConfig::default();
        assert_eq!(config.generator.max_combinations.get(), 100);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn loads_toml_with_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[generator]\nmax_combinations = 250").unwrap();

        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.generator.max_combinations.get(), 250);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn loads_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"logging": {{"format": "pretty"}}}}"#).unwrap();

        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.generator.max_combinations.get(), 100);
    }

    #[test]
    fn zero_limit_in_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[generator]\nmax_combinations = 0").unwrap();
        assert!(CliConfig::load(file.path()).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = CliConfig::default()
            .with_env(env(&[
                (ENV_MAX_COMBINATIONS, " 40 "),
                (ENV_LOG_FORMAT, "compact"),
            ]))
            .unwrap();
        assert_eq!(config.generator.max_combinations.get(), 40);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn bad_environment_values_are_reported() {
        let err = CliConfig::default()
            .with_env(env(&[(ENV_MAX_COMBINATIONS, "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_COMBINATIONS));

        assert!(
            CliConfig::default()
                .with_env(env(&[(ENV_MAX_COMBINATIONS, "0")]))
                .is_err()
        );
        assert!(
            CliConfig::default()
                .with_env(env(&[(ENV_LOG_FORMAT, "xml")]))
                .is_err()
        );
    }
}
