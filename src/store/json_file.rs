use crate::store::{PersistedState, StateStore, StoreError};
use std::io::ErrorKind;
use std::path::PathBuf;

/// File-backed store writing the record as JSON.
///
/// Saves go through a sibling temp file followed by a rename, so a crash
/// mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Read(err)),
        };
        let state: PersistedState = serde_json::from_str(&contents)?;
        Ok(Some(state))
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
        }

        let contents = serde_json::to_string_pretty(state)?;
        let temp = self.temp_path();
        std::fs::write(&temp, contents).map_err(StoreError::Write)?;
        std::fs::rename(&temp, &self.path).map_err(StoreError::Write)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_state() -> PersistedState {
        PersistedState {
            count: 7,
            last_entry_at: Some("2026-08-26T10:15:30Z".to_string()),
            entry_gate_open: true,
            exit_gate_open: false,
        }
    }

    #[test]
    fn missing_file_loads_as_absent() {
        let dir = tempdir().expect("create temp dir");
        let store = JsonFileStore::new(dir.path().join("state.json"));

        let loaded = store.load().expect("load");

        assert_eq!(loaded, None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().expect("create temp dir");
        let store = JsonFileStore::new(dir.path().join("state.json"));
        let state = sample_state();

        store.save(&state).expect("save");
        let loaded = store.load().expect("load");

        assert_eq!(loaded, Some(state));
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempdir().expect("create temp dir");
        let store = JsonFileStore::new(dir.path().join("nested/data/state.json"));

        store.save(&sample_state()).expect("save");

        assert!(store.load().expect("load").is_some());
    }

    #[test]
    fn save_overwrites_previous_record() {
        let dir = tempdir().expect("create temp dir");
        let store = JsonFileStore::new(dir.path().join("state.json"));
        let mut state = sample_state();

        store.save(&state).expect("first save");
        state.count = 8;
        store.save(&state).expect("second save");

        assert_eq!(store.load().expect("load"), Some(state));
    }

    #[test]
    fn corrupt_file_returns_parse_error() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").expect("write corrupt file");
        let store = JsonFileStore::new(path);

        let result = store.load();

        assert!(matches!(result, Err(StoreError::Parse(_))));
    }
}
