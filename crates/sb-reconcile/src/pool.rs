use tracing::{debug, warn};

use crate::distance;

/// Names still available for assignment in one run.
///
/// A name leaves the pool the moment it is assigned, so no two rows can
/// receive the same name. Order is the order the names were supplied in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePool {
    names: Vec<String>,
}

impl CandidatePool {
    /// Build a pool, dropping blank entries and repeated names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if name.is_empty() {
                continue;
            }
            if pool.contains(&name) {
                warn!("Duplicate candidate '{}' ignored", name);
                continue;
            }
            pool.push(name);
        }
        debug!("Candidate pool: {} name(s)", pool.len());
        Self { names: pool }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names not yet assigned, in the order they were supplied
    pub fn remaining(&self) -> &[String] {
        &self.names
    }

    /// Nearest remaining name to `text`: `(index, distance)`
    pub fn nearest(&self, text: &str) -> Option<(usize, usize)> {
        distance::nearest(text, self.names.iter().map(String::as_str))
    }

    /// Remove and return the name at `index`, keeping the order of the rest.
    pub fn take(&mut self, index: usize) -> Option<String> {
        if index < self.names.len() {
            Some(self.names.remove(index))
        } else {
            None
        }
    }

    /// Empty the pool, returning what was left in order
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.names)
    }
}
