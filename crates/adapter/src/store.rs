//! Snapshot storage backends and settings files.
//!
//! The core only produces and consumes [`GameSnapshot`] values; where they
//! live is decided here.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use zwap_core::{GameSettings, GameSnapshot};

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "store_io",
            StoreError::Json(_) => "store_json",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage I/O failed: {}", e),
            StoreError::Json(e) => write!(f, "stored JSON is invalid: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

pub trait SnapshotStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing has been saved yet
    fn load(&mut self) -> Result<Option<GameSnapshot>, StoreError>;

    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Pretty-printed JSON file, replaced atomically on save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.temp_path();
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        debug!("saved game {} to {}", snapshot.id, self.path.display());
        Ok(())
    }

    fn load(&mut self) -> Result<Option<GameSnapshot>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Keeps the latest snapshot in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<GameSnapshot>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<(), StoreError> {
        self.snapshot = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }

    fn load(&mut self) -> Result<Option<GameSnapshot>, StoreError> {
        Ok(self.snapshot.clone())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        Ok(())
    }
}

/// Read `GameSettings` from a JSON file; missing fields take their defaults.
/// The result is not validated here.
pub fn load_settings_file(path: &Path) -> Result<GameSettings, StoreError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zwap_core::Game;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("zwap-store-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_file_store_roundtrip_and_missing_file() {
        let path = temp_file("roundtrip.json");
        let mut store = JsonFileStore::new(&path);
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());

        let snapshot = Game::new(GameSettings::normal(), 3).unwrap().snapshot();
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot));
        assert!(!store.temp_path().exists());

        store.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_reports_bad_json() {
        let path = temp_file("bad.json");
        fs::write(&path, b"{ not json").unwrap();
        let mut store = JsonFileStore::new(&path);
        let err = store.load().unwrap_err();
        assert_eq!(err.code(), "store_json");
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        let snapshot = Game::new(GameSettings::normal(), 5).unwrap().snapshot();
        store.save(&snapshot).unwrap();
        store.save(&snapshot).unwrap();
        assert_eq!(store.saves(), 2);
        assert_eq!(store.load().unwrap().map(|s| s.id), Some(5));
        store.clear().unwrap();
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_settings_file_fills_defaults() {
        let path = temp_file("settings.json");
        fs::write(&path, br#"{"columns":5,"rows":7,"max_colors":4}"#).unwrap();
        let settings = load_settings_file(&path).unwrap();
        assert_eq!((settings.columns, settings.rows, settings.max_colors), (5, 7, 4));
        assert_eq!(settings.max_block_types, GameSettings::normal().max_block_types);
        fs::remove_file(&path).unwrap();
    }
}
