// Task module - long-running automation built on the scene graph
// A task is a flat list of gated, idempotent steps. The manager runs each
// registered task on its own cancellable worker.

pub mod config;
pub mod context;
pub mod cyclic;
pub mod error;
pub mod gate;
pub mod manager;
pub mod registry;
pub mod runner;
pub mod types;
pub mod worker;


pub use config::{
    ConfigError, ConfigOption, ConfigResult, ConfigSource, DefaultsSource, PromptSource,
    TaskConfig, ValueKind,
};
pub use context::TaskContext;
pub use cyclic::CyclicQueue;
pub use error::{TaskError, TaskResult};
pub use gate::{CAN_RUN, CAN_RUN_AFTER_BATTLE, GateError, GateResult, PauseGates};
pub use manager::{TaskEnvironment, TaskManager};
pub use registry::{TaskBuilder, TaskDefinition, TaskRegistry};
pub use runner::{DEFAULT_STEP_BACKOFF, run_task};
pub use types::{Task, TaskState, TaskStatus};
pub use worker::Worker;
