//! Round-robin rotation over a fixed list (fleets, duties)

use super::config::{ConfigError, ConfigResult};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct CyclicQueue<T> {
    items: Vec<T>,
    cursor: usize,
}

impl<T: Clone> CyclicQueue<T> {
    /// Empty rotations are rejected so `next` can never fail.
    pub fn new(items: Vec<T>) -> ConfigResult<Self> {
        if items.is_empty() {
            return Err(ConfigError::EmptyRotation);
        }
        Ok(Self { items, cursor: 0 })
    }

    /// Item at the cursor, then advance (wrapping).
    pub fn next(&mut self) -> T {
        let item = self.items[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.items.len();
        item
    }

    pub fn peek(&self) -> &T {
        &self.items[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone + FromStr> CyclicQueue<T> {
    /// Parse a comma separated list, e.g. `"4,5"`.
    pub fn parse(csv: &str) -> ConfigResult<Self> {
        let items = csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                    name: "rotation".to_string(),
                    value: s.to_string(),
                    expected: "a comma separated list",
                })
            })
            .collect::<ConfigResult<Vec<T>>>()?;
        Self::new(items)
    }
}
