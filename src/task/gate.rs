//! Named pause gates; a task's cancellation token always wins over a closed gate

use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Main gate every step waits on
pub const CAN_RUN: &str = "can_run";
/// Gate checked after a battle result has been saved
pub const CAN_RUN_AFTER_BATTLE: &str = "can_run_after_battle";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Unknown gate '{name}'")]
    UnknownGate { name: String },

    #[error("Gate wait cancelled")]
    Cancelled,
}

pub type GateResult<T> = Result<T, GateError>;

pub struct PauseGates {
    gates: BTreeMap<String, watch::Sender<bool>>,
}

impl PauseGates {
    /// All gates start closed.
    pub fn new(names: &[&str]) -> Self {
        let gates = names
            .iter()
            .map(|name| {
                let (tx, _rx) = watch::channel(false);
                (name.to_string(), tx)
            })
            .collect();
        Self { gates }
    }

    pub fn names(&self) -> Vec<&str> {
        self.gates.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.gates.contains_key(name)
    }

    fn gate(&self, name: &str) -> GateResult<&watch::Sender<bool>> {
        self.gates.get(name).ok_or_else(|| GateError::UnknownGate {
            name: name.to_string(),
        })
    }

    /// Resolve `None` to every gate; reject the whole call if any name is unknown.
    fn select<'a>(
        &'a self,
        names: Option<&[&'a str]>,
    ) -> GateResult<Vec<(&'a str, &'a watch::Sender<bool>)>> {
        match names {
            None => Ok(self.gates.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            Some(names) => names
                .iter()
                .map(|name| self.gate(name).map(|tx| (*name, tx)))
                .collect(),
        }
    }

    pub fn is_open(&self, name: &str) -> GateResult<bool> {
        Ok(*self.gate(name)?.borrow())
    }

    pub fn states(&self) -> Vec<(String, bool)> {
        self.gates
            .iter()
            .map(|(name, tx)| (name.clone(), *tx.borrow()))
            .collect()
    }

    fn set(&self, names: Option<&[&str]>, state: impl Fn(bool) -> bool) -> GateResult<()> {
        for (name, tx) in self.select(names)? {
            let open = state(*tx.borrow());
            tx.send_replace(open);
            log::info!(
                "⏯️ set {name} --> {}",
                if open { "running" } else { "paused" }
            );
        }
        Ok(())
    }

    pub fn pause(&self, names: Option<&[&str]>) -> GateResult<()> {
        self.set(names, |_| false)
    }

    pub fn resume(&self, names: Option<&[&str]>) -> GateResult<()> {
        self.set(names, |_| true)
    }

    pub fn reverse(&self, names: Option<&[&str]>) -> GateResult<()> {
        self.set(names, |open| !open)
    }

    /// Block until every named gate is open at the same time.
    pub async fn wait(&self, names: &[&str], cancel: &CancellationToken) -> GateResult<()> {
        let gates = self.select(Some(names))?;
        loop {
            for (_, tx) in &gates {
                let mut rx = tx.subscribe();
                tokio::select! {
                    res = rx.wait_for(|open| *open) => {
                        res.map_err(|_| GateError::Cancelled)?;
                    }
                    _ = cancel.cancelled() => return Err(GateError::Cancelled),
                }
            }
            // a gate passed earlier may have closed while waiting on a later one
            if gates.iter().all(|(_, tx)| *tx.borrow()) {
                return Ok(());
            }
        }
    }
}
