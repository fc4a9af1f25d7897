//! Process-wide mapping from chain name to adapter.
//!
//! Filled once at startup, then sealed. Keys are lower-cased on the way in and
//! on lookup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use crate::blockchain::{adapter::ChainAdapter, models::ChainError};

#[derive(Default)]
pub struct AdapterRegistry {
    adapters: DashMap<String, Arc<dyn ChainAdapter>>,
    sealed: AtomicBool,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last registration under a name wins. Returns the replaced adapter, if
    /// any. Fails once the registry has been sealed.
    pub fn register(
        &self,
        chain: &str,
        adapter: Arc<dyn ChainAdapter>,
    ) -> Result<Option<Arc<dyn ChainAdapter>>, ChainError> {
        let key = chain.trim().to_lowercase();
        if self.sealed.load(Ordering::Acquire) {
            return Err(ChainError::RegistrySealed(key));
        }
        let previous = self.adapters.insert(key.clone(), adapter);
        if previous.is_some() {
            warn!(chain = %key, "adapter re-registered; previous entry replaced");
        } else {
            info!(chain = %key, "adapter registered");
        }
        Ok(previous)
    }

    pub fn resolve(&self, chain: &str) -> Result<Arc<dyn ChainAdapter>, ChainError> {
        self.adapters
            .get(&chain.trim().to_lowercase())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ChainError::UnsupportedChain(chain.to_string()))
    }

    /// Registered chain names, sorted.
    pub fn list_supported(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Ends the startup phase; later `register` calls fail.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
