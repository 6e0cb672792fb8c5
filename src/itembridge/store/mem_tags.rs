use super::TagStore;
use crate::error::{BridgeError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory tag store for testing.
#[derive(Default)]
pub struct MemTagStore {
    tags: RwLock<HashMap<String, Vec<u8>>>,
    simulate_write_error: AtomicBool,
    simulate_read_error: AtomicBool,
}

impl MemTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.store(simulate, Ordering::SeqCst);
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.tags.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(BridgeError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl TagStore for MemTagStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.simulate_read_error.load(Ordering::SeqCst) {
            return Err(BridgeError::Store("Simulated read error".to_string()));
        }
        Ok(self.tags.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Option<&[u8]>) -> Result<()> {
        self.check_writable()?;
        let mut tags = self.tags.write();
        match value.filter(|b| !b.is_empty()) {
            Some(bytes) => {
                tags.insert(key.to_string(), bytes.to_vec());
            }
            None => {
                tags.remove(key);
            }
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.tags.write().remove(key);
        Ok(())
    }
}
