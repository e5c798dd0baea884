// Scene module - visual state machine of the game UI
// Scenes are recognized from pixel/template evidence and connected by
// transitions (click/drag sequences). The graph is built once by explicit
// registration; the tracker holds the shared (current, previous) pair.

pub mod definition;
pub mod error;
pub mod graph;
pub mod poller;
pub mod recognizer;
pub mod tracker;
pub mod transition;

#[cfg(test)]
mod tests;

pub use definition::{Scene, UNKNOWN_SCENE};
pub use error::{SceneError, SceneResult};
pub use graph::{SceneGraph, SceneGraphBuilder};
pub use poller::{DEFAULT_POLL_INTERVAL, ScenePoller};
pub use recognizer::{Predicate, Recognizer, compare_with_pixels, compare_with_template, match_ratio};
pub use tracker::{ScenePair, SceneTracker};
pub use transition::{Action, ActionFn, Transition, TransitionArgs};
