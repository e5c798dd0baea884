//! Explicit task registration

use super::config::{ConfigOption, TaskConfig};
use super::error::{TaskError, TaskResult};
use super::gate::CAN_RUN;
use super::types::Task;
use std::sync::Arc;

pub type TaskBuilder = Arc<dyn Fn(&TaskConfig) -> TaskResult<Box<dyn Task>> + Send + Sync>;

#[derive(Clone)]
pub struct TaskDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub gates: Vec<&'static str>,
    pub options: Vec<ConfigOption>,
    builder: TaskBuilder,
}

impl TaskDefinition {
    pub fn new<F>(name: &'static str, description: &'static str, builder: F) -> Self
    where
        F: Fn(&TaskConfig) -> TaskResult<Box<dyn Task>> + Send + Sync + 'static,
    {
        Self {
            name,
            description,
            gates: vec![CAN_RUN],
            options: Vec::new(),
            builder: Arc::new(builder),
        }
    }

    pub fn gates(mut self, gates: &[&'static str]) -> Self {
        self.gates = gates.to_vec();
        self
    }

    pub fn options(mut self, options: Vec<ConfigOption>) -> Self {
        self.options = options;
        self
    }

    /// Fresh config populated with the declared options and their defaults
    pub fn config(&self) -> TaskConfig {
        TaskConfig::new(self.options.clone())
    }

    pub fn build(&self, config: &TaskConfig) -> TaskResult<Box<dyn Task>> {
        (self.builder)(config)
    }
}

#[derive(Default, Clone)]
pub struct TaskRegistry {
    definitions: Vec<TaskDefinition>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: TaskDefinition) -> TaskResult<&mut Self> {
        if self.definitions.iter().any(|d| d.name == definition.name) {
            return Err(TaskError::DuplicateTask {
                name: definition.name.to_string(),
            });
        }
        self.definitions.push(definition);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> TaskResult<&TaskDefinition> {
        self.definitions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| TaskError::UnknownTask {
                name: name.to_string(),
            })
    }

    /// Look up by name (case-insensitive) or by 1-based position in registration order.
    pub fn resolve(&self, name_or_index: &str) -> TaskResult<&TaskDefinition> {
        let key = name_or_index.trim();
        if let Ok(index) = key.parse::<usize>()
            && index >= 1
            && let Some(definition) = self.definitions.get(index - 1)
        {
            return Ok(definition);
        }
        self.definitions
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(key))
            .ok_or_else(|| TaskError::UnknownTask {
                name: key.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.definitions.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.definitions.iter().map(|d| d.name).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
