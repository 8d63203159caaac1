//! Explicit session registry keyed by map identifier.
//!
//! The registry is a plain value owned by the host; there is no ambient
//! global anywhere. It holds at most one live session per map identifier
//! and tells callers whether a lookup found a live session or started a
//! fresh one.

use std::collections::hash_map::Entry;

use crate::engine::GeoEngine;
use crate::prelude::HashMap;
use crate::session::{MapSession, SessionOptions};
use crate::Result;

/// Whether `open` started a fresh session or found a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Created,
    Found,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, MapSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the live session for `id`, running the full start
    /// sequence when there is none. A found session is returned as-is;
    /// `options` only apply to a fresh start.
    pub fn open(
        &mut self,
        engine: &dyn GeoEngine,
        id: &str,
        options: SessionOptions,
    ) -> Result<(OpenOutcome, &mut MapSession)> {
        match self.sessions.entry(id.to_string()) {
            Entry::Occupied(entry) => Ok((OpenOutcome::Found, entry.into_mut())),
            Entry::Vacant(entry) => {
                let session = MapSession::start(engine, id, options)?;
                Ok((OpenOutcome::Created, entry.insert(session)))
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&MapSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MapSession> {
        self.sessions.get_mut(id)
    }

    /// Tears down the session for `id` and removes it. Returns whether a
    /// session existed.
    pub fn close(&mut self, id: &str) -> Result<bool> {
        match self.sessions.remove(id) {
            Some(mut session) => {
                session.close()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Tears down every live session (host teardown).
    pub fn close_all(&mut self) -> Result<()> {
        for (_, mut session) in self.sessions.drain() {
            session.close()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryEngine;
    use crate::session::SessionState;

    #[test]
    fn test_open_creates_then_finds() {
        let engine = MemoryEngine::new();
        let mut registry = SessionRegistry::new();

        let (outcome, _) = registry
            .open(&engine, "main", SessionOptions::with_sample_cities())
            .unwrap();
        assert_eq!(outcome, OpenOutcome::Created);

        let (outcome, session) = registry
            .open(&engine, "main", SessionOptions::default())
            .unwrap();
        assert_eq!(outcome, OpenOutcome::Found);
        assert_eq!(session.state(), SessionState::Bootstrapped);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_one_session_per_identifier() {
        let engine = MemoryEngine::new();
        let mut registry = SessionRegistry::new();

        registry
            .open(&engine, "main", SessionOptions::default())
            .unwrap();
        registry
            .open(&engine, "secondary", SessionOptions::default())
            .unwrap();
        registry
            .open(&engine, "main", SessionOptions::default())
            .unwrap();

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_close_removes_session() {
        let engine = MemoryEngine::new();
        let mut registry = SessionRegistry::new();

        registry
            .open(&engine, "main", SessionOptions::default())
            .unwrap();
        assert!(registry.close("main").unwrap());
        assert!(registry.is_empty());
        assert!(!registry.close("main").unwrap());
    }

    #[test]
    fn test_failed_start_leaves_no_session() {
        let engine = MemoryEngine::new();
        let mut registry = SessionRegistry::new();

        // An unknown source SR makes projector construction fail.
        let options = SessionOptions {
            source_sr: 2154,
            seed: crate::ingest::FeatureRecord::sample_cities(),
            ..SessionOptions::default()
        };

        assert!(registry.open(&engine, "main", options).is_err());
        assert!(registry.is_empty());
    }
}
