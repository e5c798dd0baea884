// Scene: a named recognizable screen plus its outgoing transitions
use super::recognizer::Recognizer;
use super::transition::Transition;
use crate::capture::CaptureContext;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

/// Name of the sentinel published when no registered scene matches
pub const UNKNOWN_SCENE: &str = "Scene.Unknown";

pub struct Scene {
    name: &'static str,
    recognizer: Recognizer,
    ways: BTreeMap<&'static str, Transition>,
    // Last values observed by recognition helpers (e.g. chapter number).
    // Not part of identity; overwritten by the next observation.
    memo: Mutex<HashMap<&'static str, i64>>,
}

impl Scene {
    pub fn new(name: &'static str, recognizer: Recognizer) -> Self {
        Self {
            name,
            recognizer,
            ways: BTreeMap::new(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_SCENE, Recognizer::Never)
    }

    /// Add an outgoing transition (builder style)
    pub fn way(mut self, destination: &'static str, transition: Transition) -> Self {
        self.ways.insert(destination, transition);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_SCENE
    }

    pub fn at_this_scene(&self, ctx: &dyn CaptureContext) -> bool {
        self.recognizer.matches(ctx)
    }

    pub fn ways_to(&self, destination: &str) -> Option<&Transition> {
        self.ways.get(destination)
    }

    pub fn destinations(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ways.keys().copied()
    }

    pub fn remember(&self, key: &'static str, value: i64) {
        if let Ok(mut memo) = self.memo.lock() {
            memo.insert(key, value);
        }
    }

    pub fn forget(&self, key: &'static str) {
        if let Ok(mut memo) = self.memo.lock() {
            memo.remove(key);
        }
    }

    pub fn recall(&self, key: &str) -> Option<i64> {
        self.memo.lock().ok().and_then(|memo| memo.get(key).copied())
    }
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Scene {}

impl Hash for Scene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("recognizer", &self.recognizer)
            .field("ways", &self.ways.keys().collect::<Vec<_>>())
            .finish()
    }
}
