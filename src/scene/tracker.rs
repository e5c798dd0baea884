// Shared (current, previous) scene pair.
// Every write replaces the whole pair; concurrent writers resolve as last-write-wins.

use super::definition::Scene;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct ScenePair {
    pub current: Arc<Scene>,
    pub previous: Arc<Scene>,
}

pub struct SceneTracker {
    tx: watch::Sender<ScenePair>,
}

impl SceneTracker {
    /// Start with both slots pointing at `initial` (normally the unknown sentinel).
    pub fn new(initial: Arc<Scene>) -> Self {
        let (tx, _rx) = watch::channel(ScenePair {
            current: initial.clone(),
            previous: initial,
        });
        Self { tx }
    }

    pub fn current(&self) -> Arc<Scene> {
        self.tx.borrow().current.clone()
    }

    pub fn previous(&self) -> Arc<Scene> {
        self.tx.borrow().previous.clone()
    }

    pub fn pair(&self) -> ScenePair {
        self.tx.borrow().clone()
    }

    pub fn is_at(&self, name: &str) -> bool {
        self.tx.borrow().current.is(name)
    }

    /// Rotate `(previous, current) <- (current, scene)` unless `scene` is already current.
    /// Returns whether the pair changed.
    pub fn update(&self, scene: Arc<Scene>) -> bool {
        let mut switched: Option<(&'static str, &'static str)> = None;
        self.tx.send_if_modified(|pair| {
            if *pair.current == *scene {
                return false;
            }
            switched = Some((pair.current.name(), scene.name()));
            pair.previous = std::mem::replace(&mut pair.current, scene);
            true
        });
        if let Some((prev, cur)) = switched {
            log::info!("🔄 switch scene ({prev} --> {cur})");
            return true;
        }
        false
    }

    /// Publish the result of a confirmed transition `from -> to`.
    pub fn publish_transition(&self, from: Arc<Scene>, to: Arc<Scene>) {
        let (from_name, to_name) = (from.name(), to.name());
        self.tx.send_modify(|pair| {
            pair.previous = from;
            pair.current = to;
        });
        log::debug!("➡️ arrived ({from_name} --> {to_name})");
    }

    pub fn subscribe(&self) -> watch::Receiver<ScenePair> {
        self.tx.subscribe()
    }

    /// Wait until the current scene is `name`. Returns `false` if cancelled first.
    pub async fn wait_for_scene(&self, name: &str, cancel: &CancellationToken) -> bool {
        let mut rx = self.subscribe();
        tokio::select! {
            res = rx.wait_for(|pair| pair.current.is(name)) => res.is_ok(),
            _ = cancel.cancelled() => false,
        }
    }
}
