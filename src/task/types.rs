// Core task types and traits
use super::context::TaskContext;
use super::error::TaskResult;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::fmt;

/// A long-running automation task.
///
/// `execute` is one pass over a flat list of guarded steps ("if at scene S,
/// do A"). Each step must be idempotent: the shared scene tracker, not a
/// program counter, decides which step applies next.
#[async_trait]
pub trait Task: Send {
    fn name(&self) -> &str;

    async fn execute(&mut self, cx: &TaskContext) -> TaskResult<()>;

    /// Goal reached; the run loop stops before the next pass.
    fn is_finished(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Alive,
    Dead,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Alive => write!(f, "Alive"),
            TaskState::Dead => write!(f, "Dead"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskStatus {
    pub name: String,
    pub state: TaskState,
    pub started_at: DateTime<Local>,
    pub gates: Vec<(String, bool)>,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gates: Vec<String> = self
            .gates
            .iter()
            .map(|(name, open)| format!("{name}={}", if *open { "on" } else { "off" }))
            .collect();
        write!(
            f,
            "{} [{}] since {} ({})",
            self.name,
            self.state,
            self.started_at.format("%H:%M:%S"),
            gates.join(", ")
        )
    }
}
