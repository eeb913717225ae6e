//! JSON file implementation of [`SnapshotStore`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use swipefit_core::errors::StoreError;
use swipefit_core::session::{SessionSnapshot, SnapshotStore};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<SessionSnapshot>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error(error)),
        };

        let snapshot = SessionSnapshot::from_json(&raw)?;
        debug!(
            event_name = "store.snapshot.loaded",
            path = %self.path.display(),
            wishlist_size = snapshot.wishlist.len(),
            "session snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    /// Writes a sibling temp file and renames it over the target.
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let encoded = snapshot.to_json()?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, encoded).map_err(|error| self.io_error(error))?;
        fs::rename(&temp_path, &self.path).map_err(|error| self.io_error(error))?;

        debug!(event_name = "store.snapshot.saved", path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("state.json"));

        assert!(store.load().expect("load").is_none());
        store.clear().expect("clearing a missing file is fine");
    }

    #[test]
    fn save_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("state.json");
        let store = JsonFileStore::new(&path);

        store.save(&SessionSnapshot::default()).expect("save");

        assert!(path.exists());
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
        assert_eq!(store.load().expect("load"), Some(SessionSnapshot::default()));
    }

    #[test]
    fn unparseable_file_is_a_snapshot_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").expect("write");

        let error = JsonFileStore::new(&path).load().expect_err("corrupt state");
        assert!(matches!(error, StoreError::Snapshot(_)));
    }
}
