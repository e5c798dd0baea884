//! Application config file

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "auto-game.toml";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("'{field}' must be greater than zero")]
    ZeroInterval { field: &'static str },

    #[error("Unsupported value for tasks.{task}.{option}: arrays of scalars, strings, numbers and booleans only")]
    UnsupportedOption { task: String, option: String },
}

pub type AppConfigResult<T> = Result<T, AppConfigError>;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assets: PathBuf,
    pub results_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub step_backoff_ms: u64,
    /// Ask for task options on the console; otherwise defaults are used
    pub interactive_config: bool,
    pub tasks: BTreeMap<String, toml::Table>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets/azur_lane.toml"),
            results_dir: PathBuf::from("results"),
            poll_interval_ms: 1000,
            step_backoff_ms: 1000,
            interactive_config: true,
            tasks: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> AppConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| AppConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw).map_err(|source| AppConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("⚙️ Loaded config {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Load `path` if given, else the default file when it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> AppConfigResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.exists() {
            return Self::load(default);
        }
        log::debug!("⚙️ No {DEFAULT_CONFIG_FILE}, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> AppConfigResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(AppConfigError::ZeroInterval {
                field: "poll_interval_ms",
            });
        }
        self.task_overrides().map(|_| ())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn step_backoff(&self) -> Duration {
        Duration::from_millis(self.step_backoff_ms)
    }

    /// `[tasks.<Name>]` tables as option strings. Arrays become comma separated lists.
    pub fn task_overrides(&self) -> AppConfigResult<BTreeMap<String, BTreeMap<String, String>>> {
        self.tasks
            .iter()
            .map(|(task, table)| {
                let options = table
                    .iter()
                    .map(|(option, value)| {
                        option_string(value)
                            .map(|v| (option.clone(), v))
                            .ok_or_else(|| AppConfigError::UnsupportedOption {
                                task: task.clone(),
                                option: option.clone(),
                            })
                    })
                    .collect::<AppConfigResult<BTreeMap<_, _>>>()?;
                Ok((task.clone(), options))
            })
            .collect()
    }
}

fn option_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                toml::Value::Array(_) | toml::Value::Table(_) => None,
                scalar => option_string(scalar),
            })
            .collect::<Option<Vec<_>>>()
            .map(|items| items.join(",")),
        toml::Value::Datetime(_) | toml::Value::Table(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_fields() {
        let config = AppConfig::from_toml_str("poll_interval_ms = 250").unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.step_backoff(), Duration::from_secs(1));
        assert!(config.interactive_config);
        assert!(config.tasks.is_empty());
    }

    #[test]
    fn test_task_overrides_are_stringified() {
        let config = AppConfig::from_toml_str(
            r#"
            [tasks.FarmChapter]
            team_one = [4, 5]
            target_stage = "13-4"
            max_farm_time = 3
            "#,
        )
        .unwrap();
        let overrides = config.task_overrides().unwrap();
        let farm = &overrides["FarmChapter"];
        assert_eq!(farm["team_one"], "4,5");
        assert_eq!(farm["target_stage"], "13-4");
        assert_eq!(farm["max_farm_time"], "3");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AppConfig::from_toml_str("poll_interval_ms = 0").unwrap();
        assert!(matches!(
            config.validate(),
            Err(AppConfigError::ZeroInterval { .. })
        ));

        let config = AppConfig::from_toml_str("[tasks.X.nested]\na = 1").unwrap();
        assert!(matches!(
            config.validate(),
            Err(AppConfigError::UnsupportedOption { .. })
        ));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "poll_interval_ms = \"fast\"").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, AppConfigError::Parse { .. }));

        std::fs::write(&path, "results_dir = \"out\"").unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.results_dir, PathBuf::from("out"));
    }
}
