// Scene poller: keeps the tracker in sync with what is on screen
use super::definition::Scene;
use super::error::SceneResult;
use super::graph::SceneGraph;
use super::tracker::SceneTracker;
use crate::capture::CaptureContext;
use crate::task::Worker;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct ScenePoller {
    graph: Arc<SceneGraph>,
    ctx: Arc<dyn CaptureContext>,
    tracker: Arc<SceneTracker>,
    interval: Duration,
}

impl ScenePoller {
    pub fn new(
        graph: Arc<SceneGraph>,
        ctx: Arc<dyn CaptureContext>,
        tracker: Arc<SceneTracker>,
    ) -> Self {
        Self {
            graph,
            ctx,
            tracker,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Recognize once on the blocking pool
    pub async fn recognize(&self) -> SceneResult<Arc<Scene>> {
        let graph = self.graph.clone();
        let ctx = self.ctx.clone();
        Ok(tokio::task::spawn_blocking(move || graph.recognize(ctx.as_ref())).await?)
    }

    /// One poll: recognize and publish. Returns whether the scene changed.
    pub async fn tick(&self) -> SceneResult<bool> {
        let scene = self.recognize().await?;
        Ok(self.tracker.update(scene))
    }

    /// Run until the worker is terminated. Not pausable.
    pub fn start(self) -> Worker {
        Worker::spawn("ScenePoller", move |cancel| async move {
            log::info!(
                "👁️ Scene poller started (interval {}ms)",
                self.interval.as_millis()
            );
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.tick().await {
                            log::warn!("⚠️ Scene poll failed: {e}");
                        }
                    }
                }
            }
            log::info!("👁️ Scene poller stopped");
        })
    }
}
