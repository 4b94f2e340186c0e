use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DURATION_MINUTES, DEFAULT_START_TIME, FETCH_TIMEOUT_SECS, USER_AGENT,
};
use crate::error::{Result, ScraperError};

/// Immutable HTTP settings handed to the fetcher at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
        }
    }
}

/// Knobs for turning schedule rows into calendar records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub duration_minutes: u32,
    pub enrich_venues: bool,
    /// Used only when the time cell is empty
    pub default_time: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_DURATION_MINUTES,
            enrich_venues: true,
            default_time: DEFAULT_START_TIME.to_string(),
        }
    }
}

/// Optional TOML file; every key may be omitted.
///
/// ```toml
/// [fetch]
/// user_agent = "my-agent/1.0"
/// timeout_seconds = 10
///
/// [export]
/// duration_minutes = 90
/// default_time = "20:00"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSection {
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportSection {
    pub duration_minutes: Option<u32>,
    pub default_time: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(content)?;
        if config.fetch.timeout_seconds == Some(0) {
            return Err(ScraperError::Config(
                "fetch.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            user_agent: self
                .fetch
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
            timeout: self
                .fetch
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// File values sit between the built-in defaults and explicit CLI flags.
    pub fn export_options(&self, duration_flag: Option<u32>, no_enrich: bool) -> ExportOptions {
        let defaults = ExportOptions::default();
        ExportOptions {
            duration_minutes: duration_flag
                .or(self.export.duration_minutes)
                .unwrap_or(defaults.duration_minutes),
            enrich_venues: !no_enrich,
            default_time: self
                .export
                .default_time
                .clone()
                .unwrap_or(defaults.default_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::parse("").unwrap();
        assert_eq!(config.fetch_config(), FetchConfig::default());
        assert_eq!(config.export_options(None, false), ExportOptions::default());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let config = FileConfig::parse(
            r#"
            [fetch]
            user_agent = "test-agent"
            timeout_seconds = 5

            [export]
            duration_minutes = 90
            default_time = "20:00"
            "#,
        )
        .unwrap();

        let fetch = config.fetch_config();
        assert_eq!(fetch.user_agent, "test-agent");
        assert_eq!(fetch.timeout, Duration::from_secs(5));

        let export = config.export_options(None, false);
        assert_eq!(export.duration_minutes, 90);
        assert_eq!(export.default_time, "20:00");
        assert!(export.enrich_venues);
    }

    #[test]
    fn test_cli_flags_win_over_file() {
        let config = FileConfig::parse("[export]\nduration_minutes = 90\n").unwrap();
        let export = config.export_options(Some(45), true);
        assert_eq!(export.duration_minutes, 45);
        assert!(!export.enrich_venues);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = FileConfig::parse("[fetch]\ntimeout_seconds = 0\n").unwrap_err();
        assert!(matches!(err, ScraperError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = FileConfig::parse("[fetch]\nretries = 3\n").unwrap_err();
        assert!(matches!(err, ScraperError::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = FileConfig::load(Path::new("/nonexistent/nuliga.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
