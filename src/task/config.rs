//! Per-task options: config file values first, then a ConfigSource for the rest

use super::cyclic::CyclicQueue;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWriteExt, Lines};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("A rotation needs at least one item")]
    EmptyRotation,

    #[error("Unknown option '{name}'")]
    UnknownOption { name: String },

    #[error("Invalid value for '{name}': '{value}' (expected {expected})")]
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to read option value: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    /// Comma separated, non-empty items
    List,
}

impl ValueKind {
    fn expected(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "an integer",
            ValueKind::List => "a comma separated list",
        }
    }

    fn validate(&self, value: &str) -> bool {
        match self {
            ValueKind::Text => true,
            ValueKind::Integer => value.trim().parse::<i64>().is_ok(),
            ValueKind::List => value.split(',').all(|item| !item.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigOption {
    pub name: &'static str,
    pub default: String,
    pub introduction: &'static str,
    pub kind: ValueKind,
    pub value: Option<String>,
}

impl ConfigOption {
    fn new(name: &'static str, default: impl ToString, introduction: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            default: default.to_string(),
            introduction,
            kind,
            value: None,
        }
    }

    pub fn text(name: &'static str, default: impl ToString, introduction: &'static str) -> Self {
        Self::new(name, default, introduction, ValueKind::Text)
    }

    pub fn integer(name: &'static str, default: i64, introduction: &'static str) -> Self {
        Self::new(name, default, introduction, ValueKind::Integer)
    }

    pub fn list(name: &'static str, default: impl ToString, introduction: &'static str) -> Self {
        Self::new(name, default, introduction, ValueKind::List)
    }

    /// Current value, falling back to the default
    pub fn effective(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.default)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskConfig {
    options: Vec<ConfigOption>,
}

impl TaskConfig {
    pub fn new(options: Vec<ConfigOption>) -> Self {
        let mut config = Self::default();
        config.set_all(options);
        config
    }

    /// Add options, replacing any with the same name.
    pub fn set_all(&mut self, options: Vec<ConfigOption>) {
        for option in options {
            match self.options.iter_mut().find(|o| o.name == option.name) {
                Some(existing) => *existing = option,
                None => self.options.push(option),
            }
        }
    }

    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    fn option(&self, name: &str) -> ConfigResult<&ConfigOption> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .ok_or_else(|| ConfigError::UnknownOption {
                name: name.to_string(),
            })
    }

    pub fn set(&mut self, name: &str, value: &str) -> ConfigResult<()> {
        let option = self
            .options
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| ConfigError::UnknownOption {
                name: name.to_string(),
            })?;
        if !option.kind.validate(value) {
            return Err(ConfigError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                expected: option.kind.expected(),
            });
        }
        option.value = Some(value.trim().to_string());
        Ok(())
    }

    pub fn get_str(&self, name: &str) -> ConfigResult<&str> {
        Ok(self.option(name)?.effective())
    }

    pub fn get<T: FromStr>(&self, name: &str) -> ConfigResult<T> {
        let option = self.option(name)?;
        let raw = option.effective();
        raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            expected: option.kind.expected(),
        })
    }

    pub fn rotation<T: Clone + FromStr>(&self, name: &str) -> ConfigResult<CyclicQueue<T>> {
        let raw = self.get_str(name)?;
        CyclicQueue::parse(raw).map_err(|e| match e {
            ConfigError::InvalidValue { value, expected, .. } => ConfigError::InvalidValue {
                name: name.to_string(),
                value,
                expected,
            },
            other => other,
        })
    }

    /// Apply values from the application config file.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) -> ConfigResult<()> {
        for (name, value) in overrides {
            self.set(name, value)?;
        }
        Ok(())
    }

    /// Ask `source` for every option without a value. Empty answers keep the default.
    pub async fn fill_missing(&mut self, source: &mut dyn ConfigSource) -> ConfigResult<()> {
        for i in 0..self.options.len() {
            if self.options[i].value.is_some() {
                continue;
            }
            let answer = source.provide(&self.options[i]).await?;
            let name = self.options[i].name;
            let value = answer
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| self.options[i].default.clone());
            self.set(name, &value)?;
        }
        self.show();
        Ok(())
    }

    pub fn show(&self) {
        log::info!("⚙️ Current config:");
        for option in &self.options {
            log::info!("   {} = {} ({})", option.name, option.effective(), option.introduction);
        }
    }
}

/// Where unset option values come from
#[async_trait]
pub trait ConfigSource: Send {
    /// `Ok(None)` or an empty string keeps the default.
    async fn provide(&mut self, option: &ConfigOption) -> ConfigResult<Option<String>>;
}

/// Accept every default without asking
pub struct DefaultsSource;

#[async_trait]
impl ConfigSource for DefaultsSource {
    async fn provide(&mut self, _option: &ConfigOption) -> ConfigResult<Option<String>> {
        Ok(None)
    }
}

/// Prompt on stdout and read answers from a line reader (normally the console's stdin)
pub struct PromptSource<'a, R> {
    lines: &'a mut Lines<R>,
}

impl<'a, R> PromptSource<'a, R> {
    pub fn new(lines: &'a mut Lines<R>) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl<'a, R> ConfigSource for PromptSource<'a, R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn provide(&mut self, option: &ConfigOption) -> ConfigResult<Option<String>> {
        let prompt = format!(
            "Set config {} - {} [{}]: ",
            option.name, option.introduction, option.default
        );
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;
        Ok(self.lines.next_line().await?)
    }
}
