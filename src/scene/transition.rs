//! Transition edges: the input sequence that moves the game from one scene to another

use super::error::{SceneError, SceneResult};
use crate::capture::{CaptureContext, Point, Rect};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Named arguments forwarded from the caller of `goto` to the transition action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionArgs(BTreeMap<String, String>);

impl TransitionArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn require(&self, scene: &str, name: &str) -> SceneResult<&str> {
        self.get(name).ok_or_else(|| SceneError::MissingArgument {
            scene: scene.to_string(),
            name: name.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub type ActionFn =
    Arc<dyn Fn(&dyn CaptureContext, &TransitionArgs) -> SceneResult<()> + Send + Sync>;

#[derive(Clone)]
pub enum Action {
    /// Click a random point inside the rectangle
    Click(Rect),
    ClickAt(Point),
    Drag {
        from: Point,
        to: Point,
        duration: Duration,
    },
    /// Blocking pause between inputs of a sequence
    Pause(Duration),
    Sequence(Vec<Action>),
    Custom(ActionFn),
}

impl Action {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&dyn CaptureContext, &TransitionArgs) -> SceneResult<()> + Send + Sync + 'static,
    {
        Action::Custom(Arc::new(f))
    }

    /// Run the inputs synchronously; callers put this on the blocking pool.
    pub fn perform(&self, ctx: &dyn CaptureContext, args: &TransitionArgs) -> SceneResult<()> {
        match self {
            Action::Click(rect) => ctx.click(rect.random_point())?,
            Action::ClickAt(point) => ctx.click(*point)?,
            Action::Drag { from, to, duration } => ctx.drag(*from, *to, *duration)?,
            Action::Pause(duration) => std::thread::sleep(*duration),
            Action::Sequence(actions) => {
                for action in actions {
                    action.perform(ctx, args)?;
                }
            }
            Action::Custom(f) => f(ctx, args)?,
        }
        Ok(())
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Click(rect) => write!(f, "Click({rect})"),
            Action::ClickAt(point) => write!(f, "ClickAt({point})"),
            Action::Drag { from, to, duration } => write!(f, "Drag({from} -> {to}, {duration:?})"),
            Action::Pause(duration) => write!(f, "Pause({duration:?})"),
            Action::Sequence(actions) => f.debug_tuple("Sequence").field(actions).finish(),
            Action::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Outgoing edge of a scene: what to do, then how long the target screen needs to settle
#[derive(Debug, Clone)]
pub struct Transition {
    pub action: Action,
    pub settle: Duration,
}

impl Transition {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            settle: Duration::ZERO,
        }
    }

    pub fn click(rect: Rect) -> Self {
        Self::new(Action::Click(rect))
    }

    pub fn click_at(point: Point) -> Self {
        Self::new(Action::ClickAt(point))
    }

    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn settle_secs(self, secs: f32) -> Self {
        self.settle(Duration::from_secs_f32(secs))
    }
}
