//! Everything a running task step can touch

use super::error::{TaskError, TaskResult};
use super::gate::PauseGates;
use crate::capture::{CaptureContext, Rect};
use crate::scene::{Action, Scene, SceneGraph, SceneTracker, TransitionArgs};
use crate::vision::TextRecognizer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct TaskContext {
    name: String,
    capture: Arc<dyn CaptureContext>,
    scenes: Arc<SceneGraph>,
    tracker: Arc<SceneTracker>,
    gates: Arc<PauseGates>,
    cancel: CancellationToken,
    results_dir: PathBuf,
    text: Arc<dyn TextRecognizer>,
}

impl TaskContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        capture: Arc<dyn CaptureContext>,
        scenes: Arc<SceneGraph>,
        tracker: Arc<SceneTracker>,
        gates: Arc<PauseGates>,
        cancel: CancellationToken,
        results_dir: PathBuf,
        text: Arc<dyn TextRecognizer>,
    ) -> Self {
        Self {
            name: name.into(),
            capture,
            scenes,
            tracker,
            gates,
            cancel,
            results_dir,
            text,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capture(&self) -> &Arc<dyn CaptureContext> {
        &self.capture
    }

    pub fn scenes(&self) -> &SceneGraph {
        &self.scenes
    }

    pub fn tracker(&self) -> &SceneTracker {
        &self.tracker
    }

    pub fn gates(&self) -> &PauseGates {
        &self.gates
    }

    pub fn text_recognizer(&self) -> &Arc<dyn TextRecognizer> {
        &self.text
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail fast with `Cancelled` once the task has been stopped.
    pub fn checkpoint(&self) -> TaskResult<()> {
        if self.cancel.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        Ok(())
    }

    /// Block until every named gate is open.
    pub async fn wait(&self, gates: &[&str]) -> TaskResult<()> {
        self.gates.wait(gates, &self.cancel).await?;
        Ok(())
    }

    pub async fn sleep(&self, duration: Duration) -> TaskResult<()> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.cancel.cancelled() => Err(TaskError::Cancelled),
        }
    }

    pub async fn sleep_secs(&self, secs: f32) -> TaskResult<()> {
        self.sleep(Duration::from_secs_f32(secs)).await
    }

    pub fn scene_cur(&self) -> Arc<Scene> {
        self.tracker.current()
    }

    pub fn scene_prev(&self) -> Arc<Scene> {
        self.tracker.previous()
    }

    /// Whether the tracker currently names `scene`
    pub fn at(&self, scene: &str) -> bool {
        self.tracker.is_at(scene)
    }

    pub async fn goto(&self, target: &str) -> TaskResult<bool> {
        self.goto_with(target, &TransitionArgs::new()).await
    }

    pub async fn goto_with(&self, target: &str, args: &TransitionArgs) -> TaskResult<bool> {
        self.checkpoint()?;
        Ok(self
            .scenes
            .goto(&self.capture, &self.tracker, target, args)
            .await?)
    }

    /// `goto(to)` only if the tracker says we are at `from`.
    pub async fn switch_scene(&self, from: &str, to: &str) -> TaskResult<bool> {
        if !self.at(from) {
            return Ok(false);
        }
        let from = self.scene_cur();
        self.checkpoint()?;
        Ok(self
            .scenes
            .goto_from(&self.capture, &self.tracker, from, to, &TransitionArgs::new())
            .await?)
    }

    /// Run an input sequence atomically on the blocking pool.
    pub async fn perform(&self, action: Action) -> TaskResult<()> {
        self.perform_with(action, TransitionArgs::new()).await
    }

    pub async fn perform_with(&self, action: Action, args: TransitionArgs) -> TaskResult<()> {
        self.checkpoint()?;
        let capture = self.capture.clone();
        tokio::task::spawn_blocking(move || action.perform(capture.as_ref(), &args)).await??;
        Ok(())
    }

    /// Evaluate a read-only check against the capture context on the blocking pool.
    pub async fn observe<T, F>(&self, check: F) -> TaskResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CaptureContext) -> T + Send + 'static,
    {
        let capture = self.capture.clone();
        Ok(tokio::task::spawn_blocking(move || check(capture.as_ref())).await?)
    }

    /// Retry a fallible recognition up to `1 + max_retry` times, `interval` apart.
    /// Exhaustion is reported as `RecognitionUnavailable`.
    pub async fn retry<T, E, F>(
        &self,
        what: &str,
        max_retry: u32,
        interval: Duration,
        check: F,
    ) -> TaskResult<T>
    where
        T: Send + 'static,
        E: std::fmt::Display + Send + 'static,
        F: Fn(&dyn CaptureContext) -> Result<T, E> + Send + Sync + 'static,
    {
        let check = Arc::new(check);
        let mut last_error = String::new();
        for attempt in 0..=max_retry {
            if attempt > 0 {
                self.sleep(interval).await?;
            }
            let check = check.clone();
            match self.observe(move |ctx| check(ctx)).await? {
                Ok(value) => return Ok(value),
                Err(e) => last_error = e.to_string(),
            }
        }
        log::debug!("🔁 {what}: gave up after {} attempts ({last_error})", max_retry + 1);
        Err(TaskError::RecognitionUnavailable {
            what: what.to_string(),
            attempts: max_retry + 1,
            last_error,
        })
    }

    /// Screenshot `rect` to `<results_dir>/<subdir>/<YYYYmmdd_HHMMSS>.png`.
    pub async fn save_region(&self, rect: Rect, subdir: &str) -> TaskResult<PathBuf> {
        let image = self.observe(move |ctx| ctx.screenshot(rect)).await??;
        let dir = self.results_dir.join(subdir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| TaskError::Io {
                path: dir.clone(),
                source,
            })?;
        let file = dir.join(format!(
            "{}.png",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        let target = file.clone();
        tokio::task::spawn_blocking(move || image.save(&target))
            .await?
            .map_err(|source| TaskError::Image {
                path: file.clone(),
                source,
            })?;
        log::info!("💾 [{}] saved {}", self.name, file.display());
        Ok(file)
    }
}
