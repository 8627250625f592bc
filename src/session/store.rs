use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Set,
    Cleared,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session slot io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The one credential slot shared by every view of a running portal.
///
/// Writes replace the whole slot; the last writer wins.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, credential: String) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

pub struct MemorySessionStore {
    slot: RwLock<Option<String>>,
    events_tx: broadcast::Sender<SessionEvent>,
}

impl MemorySessionStore {
    pub fn new(event_buffer_size: usize) -> Self {
        let (events_tx, _unused_rx) = broadcast::channel(event_buffer_size.max(1));
        Self {
            slot: RwLock::new(None),
            events_tx,
        }
    }

    pub fn with_credential(event_buffer_size: usize, credential: impl Into<String>) -> Self {
        let store = Self::new(event_buffer_size);
        *store.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner()) =
            Some(credential.into());
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credential: String) -> Result<(), StoreError> {
        *self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential);
        let _ = self.events_tx.send(SessionEvent::Set);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let _ = self.events_tx.send(SessionEvent::Cleared);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }
}

/// Slot persisted as a single file. Reads go to disk every time, so another
/// portal process sharing the file is picked up on the next read.
pub struct FileSessionStore {
    path: PathBuf,
    events_tx: broadcast::Sender<SessionEvent>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>, event_buffer_size: usize) -> Self {
        let (events_tx, _unused_rx) = broadcast::channel(event_buffer_size.max(1));
        Self {
            path: path.into(),
            events_tx,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let credential = raw.trim();
                (!credential.is_empty()).then(|| credential.to_string())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read session slot");
                None
            }
        }
    }

    fn set(&self, credential: String) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a concurrent reader never sees a torn credential.
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, credential.as_bytes())?;
        fs::rename(&staging, &self.path)?;

        debug!(path = %self.path.display(), "session slot written");
        let _ = self.events_tx.send(SessionEvent::Set);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        debug!(path = %self.path.display(), "session slot cleared");
        let _ = self.events_tx.send(SessionEvent::Cleared);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }
}
