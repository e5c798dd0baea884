// Scene registry, recognizer and router.
// Recognition returns the first registered scene whose predicate holds.

use super::definition::{Scene, UNKNOWN_SCENE};
use super::error::{SceneError, SceneResult};
use super::tracker::SceneTracker;
use super::transition::TransitionArgs;
use crate::capture::CaptureContext;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
pub struct SceneGraphBuilder {
    scenes: Vec<Scene>,
}

impl SceneGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, scene: Scene) -> SceneResult<&mut Self> {
        if scene.is_unknown() || self.scenes.iter().any(|s| s.name() == scene.name()) {
            return Err(SceneError::DuplicateScene {
                name: scene.name().to_string(),
            });
        }
        self.scenes.push(scene);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Validate and freeze. The unknown sentinel is appended last.
    pub fn build(self) -> SceneResult<SceneGraph> {
        let known: HashMap<&str, usize> = self
            .scenes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name(), i))
            .collect();

        for scene in &self.scenes {
            for to in scene.destinations() {
                if to != UNKNOWN_SCENE && !known.contains_key(to) {
                    return Err(SceneError::DanglingTransition {
                        from: scene.name().to_string(),
                        to: to.to_string(),
                    });
                }
            }
        }

        for (i, earlier) in self.scenes.iter().enumerate() {
            for later in &self.scenes[i + 1..] {
                if earlier.recognizer().shadows(later.recognizer()) {
                    return Err(SceneError::ShadowedScene {
                        earlier: earlier.name().to_string(),
                        later: later.name().to_string(),
                    });
                }
            }
        }

        let mut scenes: Vec<Arc<Scene>> = self.scenes.into_iter().map(Arc::new).collect();
        let unknown = Arc::new(Scene::unknown());
        scenes.push(unknown.clone());
        let index = scenes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name(), i))
            .collect();

        log::debug!("🗺️ Scene graph built with {} scenes", scenes.len());
        Ok(SceneGraph {
            scenes,
            index,
            unknown,
        })
    }
}

pub struct SceneGraph {
    scenes: Vec<Arc<Scene>>,
    index: HashMap<&'static str, usize>,
    unknown: Arc<Scene>,
}

impl fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGraph")
            .field("scenes", &self.names())
            .finish()
    }
}

impl SceneGraph {
    pub fn builder() -> SceneGraphBuilder {
        SceneGraphBuilder::new()
    }

    pub fn get(&self, name: &str) -> SceneResult<Arc<Scene>> {
        self.index
            .get(name)
            .map(|&i| self.scenes[i].clone())
            .ok_or_else(|| SceneError::UnknownScene {
                name: name.to_string(),
            })
    }

    pub fn unknown(&self) -> Arc<Scene> {
        self.unknown.clone()
    }

    /// Registered scene names in priority order, sentinel last
    pub fn names(&self) -> Vec<&'static str> {
        self.scenes.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// First registered scene whose predicate holds, else the unknown sentinel.
    pub fn recognize(&self, ctx: &dyn CaptureContext) -> Arc<Scene> {
        self.scenes
            .iter()
            .find(|scene| scene.at_this_scene(ctx))
            .cloned()
            .unwrap_or_else(|| self.unknown.clone())
    }

    /// Move from the tracker's current scene to `target`. See [`SceneGraph::goto_from`].
    pub async fn goto(
        &self,
        ctx: &Arc<dyn CaptureContext>,
        tracker: &SceneTracker,
        target: &str,
        args: &TransitionArgs,
    ) -> SceneResult<bool> {
        let from = tracker.current();
        self.goto_from(ctx, tracker, from, target, args).await
    }

    /// Run the transition `from -> target` and confirm arrival.
    ///
    /// Returns `Ok(false)` without touching the game when `from` is no longer on
    /// screen, and `Ok(false)` when the target is not recognized after the
    /// action settled. A missing edge out of a recognized scene is an error. The
    /// action runs to completion on the blocking pool even if the caller is
    /// dropped meanwhile. On arrival the tracker is set to
    /// `(previous = from, current = target)`.
    pub async fn goto_from(
        &self,
        ctx: &Arc<dyn CaptureContext>,
        tracker: &SceneTracker,
        from: Arc<Scene>,
        target: &str,
        args: &TransitionArgs,
    ) -> SceneResult<bool> {
        let target_scene = self.get(target)?;
        let transition = from.ways_to(target).cloned();

        let settle = {
            let ctx = ctx.clone();
            let from = from.clone();
            let args = args.clone();
            let target = target.to_string();
            tokio::task::spawn_blocking(move || -> SceneResult<Option<Duration>> {
                if !from.at_this_scene(ctx.as_ref()) {
                    return Ok(None);
                }
                let transition = transition.ok_or_else(|| SceneError::UnreachableTransition {
                    from: from.name().to_string(),
                    to: target,
                })?;
                transition.action.perform(ctx.as_ref(), &args)?;
                Ok(Some(transition.settle))
            })
            .await??
        };
        let Some(settle) = settle else {
            log::warn!(
                "⚠️ scene changed unexpectedly (expected {}, now {})",
                from.name(),
                tracker.current().name()
            );
            return Ok(false);
        };

        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        let arrived = {
            let ctx = ctx.clone();
            let target_scene = target_scene.clone();
            tokio::task::spawn_blocking(move || target_scene.at_this_scene(ctx.as_ref())).await?
        };
        if arrived {
            tracker.publish_transition(from, target_scene);
        } else {
            log::debug!("⏳ {} --> {} not confirmed yet", from.name(), target);
        }
        Ok(arrived)
    }
}
