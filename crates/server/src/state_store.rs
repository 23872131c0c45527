//! Anti-CSRF `state` values of the demo client.
//!
//! Values are random, single use, expire after a TTL and the store never holds
//! more than `capacity` of them; when full the oldest one is dropped.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dashmap::DashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct StateStore {
    issued: DashMap<String, Instant>,
    /// Serializes `issue` so the capacity check and the insert happen as one step.
    issue_lock: Mutex<()>,
    ttl: Duration,
    capacity: usize,
}

impl StateStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            issued: DashMap::new(),
            issue_lock: Mutex::new(()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Generates and remembers a fresh state value.
    pub fn issue(&self) -> Result<String, getrandom::Error> {
        let mut bytes = [0u8; 32];
        getrandom::fill(&mut bytes)?;
        let state = URL_SAFE_NO_PAD.encode(bytes);

        let _guard = self
            .issue_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.purge_expired();
        while self.issued.len() >= self.capacity {
            let oldest = self
                .issued
                .iter()
                .min_by_key(|entry| *entry.value())
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.issued.remove(&key);
                    tracing::debug!("state store full, evicted oldest entry");
                }
                None => break,
            }
        }

        self.issued.insert(state.clone(), Instant::now());
        Ok(state)
    }

    /// Removes `state` and reports whether it was issued and is still fresh.
    pub fn consume(&self, state: &str) -> bool {
        self.issued
            .remove(state)
            .is_some_and(|(_, issued_at)| issued_at.elapsed() <= self.ttl)
    }

    /// Drops expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.issued.len();
        self.issued
            .retain(|_, issued_at| issued_at.elapsed() <= self.ttl);
        before.saturating_sub(self.issued.len())
    }

    pub fn clear(&self) {
        self.issued.clear();
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
