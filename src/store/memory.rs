use crate::store::{PersistedState, StateStore, StoreError};
use std::sync::{Arc, Mutex};

/// In-memory store used by tests in place of the file-backed one.
///
/// Failures are injectable per operation and every accepted save is kept so
/// tests can assert on write-through ordering.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    state: Option<PersistedState>,
    saved: Vec<PersistedState>,
    fail_load: bool,
    fail_save: bool,
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        let store = Self::default();
        store.lock().state = Some(state);
        store
    }

    pub fn failing_load() -> Self {
        let store = Self::default();
        store.lock().fail_load = true;
        store
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.lock().fail_save = fail;
    }

    /// Every state accepted by `save`, in order.
    pub fn saved(&self) -> Vec<PersistedState> {
        self.lock().saved.clone()
    }

    pub fn last_saved(&self) -> Option<PersistedState> {
        self.lock().saved.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().expect("memory store lock poisoned")
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        let inner = self.lock();
        if inner.fail_load {
            return Err(StoreError::Read(std::io::Error::other(
                "mock load failed",
            )));
        }
        Ok(inner.state.clone())
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_save {
            return Err(StoreError::Write(std::io::Error::other(
                "mock save failed",
            )));
        }
        inner.state = Some(state.clone());
        inner.saved.push(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state(count: u32) -> PersistedState {
        PersistedState {
            count,
            last_entry_at: None,
            entry_gate_open: false,
            exit_gate_open: false,
        }
    }

    #[test]
    fn empty_store_loads_as_absent() {
        let store = MemoryStore::empty();
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn save_records_every_write_in_order() {
        let store = MemoryStore::empty();

        store.save(&sample_state(1)).expect("save");
        store.save(&sample_state(2)).expect("save");

        assert_eq!(store.saved(), vec![sample_state(1), sample_state(2)]);
        assert_eq!(store.load().expect("load"), Some(sample_state(2)));
    }

    #[test]
    fn failing_load_returns_read_error() {
        let store = MemoryStore::failing_load();
        assert!(matches!(store.load(), Err(StoreError::Read(_))));
    }

    #[test]
    fn failing_save_keeps_previous_state() {
        let store = MemoryStore::with_state(sample_state(4));
        store.set_fail_save(true);

        assert!(matches!(
            store.save(&sample_state(5)),
            Err(StoreError::Write(_))
        ));
        assert_eq!(store.load().expect("load"), Some(sample_state(4)));
    }
}
