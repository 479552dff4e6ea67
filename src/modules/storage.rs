//! Durable state: preferences (merge-on-write), the dashboard snapshot
//! (wholesale replace) and the single last-error slot.

use crate::error::{AppError, AppResult};
use crate::models::{DashboardSnapshot, LastError, Preferences, PrefsPatch};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing::debug;

const PREFS_FILE: &str = "prefs.json";
const SNAPSHOT_FILE: &str = "snapshot.json";
const LAST_ERROR_FILE: &str = "last_error.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    PrefsChanged,
    SnapshotUpdated,
    ErrorRecorded,
}

pub struct Store {
    data_dir: PathBuf,
    tx: broadcast::Sender<StoreEvent>,
}

impl Store {
    pub fn new(data_dir: PathBuf) -> AppResult<Self> {
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
        }
        let (tx, _) = broadcast::channel(32);
        Ok(Self { data_dir, tx })
    }

    /// Observers (the popup analogue) re-render on these events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, file: &str) -> AppResult<Option<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&content)
            .map_err(|e| AppError::Storage(format!("failed to parse {}: {}", file, e)))?;
        Ok(value)
    }

    fn write_json<T: serde::Serialize>(&self, file: &str, value: &T) -> AppResult<()> {
        let content = serde_json::to_string_pretty(value)?;
        write_atomic(&self.path(file), &content)
    }

    /// Current preferences, defaults on first access, migration guard applied.
    pub fn prefs(&self) -> Preferences {
        match self.read_json::<Preferences>(PREFS_FILE) {
            Ok(Some(prefs)) => prefs.migrated(),
            Ok(None) => Preferences::default(),
            Err(e) => {
                tracing::warn!("Unreadable preferences, falling back to defaults: {}", e);
                Preferences::default()
            }
        }
    }

    /// Merge a partial update into the stored preferences.
    pub fn set_prefs(&self, patch: &PrefsPatch) -> AppResult<Preferences> {
        let mut prefs = self.prefs();
        prefs.apply(patch);
        self.write_json(PREFS_FILE, &prefs)?;
        let _ = self.tx.send(StoreEvent::PrefsChanged);
        Ok(prefs)
    }

    pub fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.read_json(SNAPSHOT_FILE).ok().flatten()
    }

    pub fn last_error(&self) -> Option<LastError> {
        // the slot is written as `null` on success, so read it as an Option
        self.read_json::<Option<LastError>>(LAST_ERROR_FILE)
            .ok()
            .flatten()
            .flatten()
    }

    /// Persist a successful extraction: the snapshot replaces the previous
    /// one and the last-error slot is cleared, as one conceptual write.
    pub fn record_success(&self, snapshot: &DashboardSnapshot) -> AppResult<()> {
        self.write_json(SNAPSHOT_FILE, snapshot)?;
        self.write_json(LAST_ERROR_FILE, &Option::<LastError>::None)?;
        let _ = self.tx.send(StoreEvent::SnapshotUpdated);
        debug!("Snapshot persisted, last error cleared");
        Ok(())
    }

    /// Overwrite the last-error slot. The snapshot is left untouched so the
    /// popup can keep showing stale data alongside the error.
    pub fn record_error(&self, error: &LastError) -> AppResult<()> {
        self.write_json(LAST_ERROR_FILE, &Some(error.clone()))?;
        let _ = self.tx.send(StoreEvent::ErrorRecorded);
        Ok(())
    }
}

fn write_atomic(path: &Path, content: &str) -> AppResult<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
