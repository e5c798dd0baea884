//! Task Manager: one worker per task name, reaped lazily when it dies on its own

use super::config::{ConfigSource, TaskConfig};
use super::context::TaskContext;
use super::error::{TaskError, TaskResult};
use super::gate::PauseGates;
use super::registry::{TaskDefinition, TaskRegistry};
use super::runner::{DEFAULT_STEP_BACKOFF, run_task};
use super::types::{TaskState, TaskStatus};
use super::worker::Worker;
use crate::capture::CaptureContext;
use crate::scene::{SceneGraph, SceneTracker};
use crate::vision::{TextRecognizer, UnavailableTextRecognizer};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Shared resources handed to every task the manager starts
#[derive(Clone)]
pub struct TaskEnvironment {
    pub capture: Arc<dyn CaptureContext>,
    pub scenes: Arc<SceneGraph>,
    pub tracker: Arc<SceneTracker>,
    pub text: Arc<dyn TextRecognizer>,
    pub results_dir: PathBuf,
    pub step_backoff: Duration,
    /// Option values per task name, taken from the application config file
    pub overrides: BTreeMap<String, BTreeMap<String, String>>,
}

impl TaskEnvironment {
    pub fn new(
        capture: Arc<dyn CaptureContext>,
        scenes: Arc<SceneGraph>,
        tracker: Arc<SceneTracker>,
    ) -> Self {
        Self {
            capture,
            scenes,
            tracker,
            text: Arc::new(UnavailableTextRecognizer),
            results_dir: PathBuf::from("results"),
            step_backoff: DEFAULT_STEP_BACKOFF,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_text_recognizer(mut self, text: Arc<dyn TextRecognizer>) -> Self {
        self.text = text;
        self
    }

    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    pub fn with_step_backoff(mut self, backoff: Duration) -> Self {
        self.step_backoff = backoff;
        self
    }

    pub fn with_overrides(mut self, overrides: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        self.overrides = overrides;
        self
    }
}

struct TaskHandle {
    gates: Arc<PauseGates>,
    worker: Worker,
    started_at: DateTime<Local>,
}

impl TaskHandle {
    fn status(&self) -> TaskStatus {
        TaskStatus {
            name: self.worker.name().to_string(),
            state: if self.worker.is_alive() {
                TaskState::Alive
            } else {
                TaskState::Dead
            },
            started_at: self.started_at,
            gates: self.gates.states(),
        }
    }
}

pub struct TaskManager {
    env: TaskEnvironment,
    registry: Arc<TaskRegistry>,
    executors: BTreeMap<String, TaskHandle>,
}

impl TaskManager {
    pub fn new(env: TaskEnvironment, registry: TaskRegistry) -> Self {
        Self {
            env,
            registry: Arc::new(registry),
            executors: BTreeMap::new(),
        }
    }

    pub fn environment(&self) -> &TaskEnvironment {
        &self.env
    }

    pub fn available_tasks(&self) -> Vec<&TaskDefinition> {
        self.registry.iter().collect()
    }

    /// Resolve a console argument (name or 1-based index) to a registered task name.
    pub fn resolve(&self, name_or_index: &str) -> TaskResult<&'static str> {
        Ok(self.registry.resolve(name_or_index)?.name)
    }

    /// Start `name` unless a live worker already runs it.
    pub async fn start_task(&mut self, name: &str, source: &mut dyn ConfigSource) -> TaskResult<bool> {
        if self.is_alive(name) {
            log::warn!("⚠️ Task {name} is already running");
            return Ok(false);
        }
        let mut config = self.task_config(name)?;
        config.fill_missing(source).await?;
        self.launch(name, &config)
    }

    pub fn task_config(&self, name: &str) -> TaskResult<TaskConfig> {
        let definition = self.registry.get(name)?;
        let mut config = definition.config();
        if let Some(overrides) = self.env.overrides.get(definition.name) {
            config.apply_overrides(overrides)?;
        }
        Ok(config)
    }

    /// Build `name` from a filled `config` and spawn its worker.
    /// Returns false when a live worker already runs it.
    pub fn launch(&mut self, name: &str, config: &TaskConfig) -> TaskResult<bool> {
        let definition = self.registry.get(name)?.clone();

        if let Some(handle) = self.executors.get(definition.name) {
            if handle.worker.is_alive() {
                log::warn!("⚠️ Task {} is already running", definition.name);
                return Ok(false);
            }
            log::info!("🧹 Reaping finished task {}", definition.name);
            self.executors.remove(definition.name);
        }

        let task = definition.build(config)?;

        let gates = Arc::new(PauseGates::new(&definition.gates));
        gates.resume(None)?;

        let env = self.env.clone();
        let task_gates = gates.clone();
        let worker = Worker::spawn(definition.name, move |cancel| {
            let cx = TaskContext::new(
                definition.name,
                env.capture,
                env.scenes,
                env.tracker,
                task_gates,
                cancel,
                env.results_dir,
                env.text,
            );
            run_task(task, cx, env.step_backoff)
        });

        log::info!("🚀 Task {} started", definition.name);
        self.executors.insert(
            definition.name.to_string(),
            TaskHandle {
                gates,
                worker,
                started_at: Local::now(),
            },
        );
        Ok(true)
    }

    /// Terminate and forget `name`. Returns false when it was not running.
    pub fn stop_task(&mut self, name: &str) -> bool {
        match self.executors.remove(name) {
            Some(handle) if handle.worker.is_alive() => {
                handle.worker.terminate();
                log::info!("🛑 Task {name} stopped");
                true
            }
            Some(_) => {
                log::info!("🧹 Task {name} had already finished");
                false
            }
            None => {
                log::warn!("⚠️ Task {name} is not running");
                false
            }
        }
    }

    pub fn list_task(&self) -> Vec<TaskStatus> {
        let statuses: Vec<TaskStatus> = self.executors.values().map(TaskHandle::status).collect();
        if statuses.is_empty() {
            log::info!("📋 No tasks started");
        }
        for status in &statuses {
            log::info!("📋 {status}");
        }
        statuses
    }

    pub fn is_alive(&self, name: &str) -> bool {
        self.executors
            .get(name)
            .is_some_and(|handle| handle.worker.is_alive())
    }

    pub fn alive_task(&self) -> Vec<&str> {
        self.executors
            .iter()
            .filter(|(_, handle)| handle.worker.is_alive())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Flip `gate` on every alive task that declares it. Returns how many were toggled.
    pub fn toggle_gate(&self, gate: &str) -> usize {
        let mut toggled = 0;
        for (name, handle) in &self.executors {
            if !handle.worker.is_alive() || !handle.gates.contains(gate) {
                continue;
            }
            match handle.gates.reverse(Some(&[gate])) {
                Ok(()) => toggled += 1,
                Err(e) => log::error!("❌ [{name}] {e}"),
            }
        }
        if toggled == 0 {
            log::info!("No task is running currently.");
        }
        toggled
    }

    pub fn gate_states(&self, name: &str) -> TaskResult<Vec<(String, bool)>> {
        self.executors
            .get(name)
            .map(|handle| handle.gates.states())
            .ok_or_else(|| TaskError::UnknownTask {
                name: name.to_string(),
            })
    }

    pub fn close(&mut self) {
        for (name, handle) in std::mem::take(&mut self.executors) {
            if handle.worker.is_alive() {
                handle.worker.terminate();
                log::info!("🛑 Task {name} stopped");
            }
        }
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.close();
    }
}
