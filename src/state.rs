use std::sync::Arc;
use std::time::Duration;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::error::AppError;
use crate::observability::metrics::Metrics;
use crate::session::store::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::session::sync::SessionWatcher;

pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub backend: BackendClient,
    pub watcher: SessionWatcher,
    pub metrics: Metrics,
}

impl AppState {
    /// Must run inside a tokio runtime: the session reconciler is spawned here.
    pub fn new(
        store: Arc<dyn SessionStore>,
        backend_url: &str,
        backend_timeout: Duration,
        session_poll_interval: Duration,
    ) -> Result<Self, AppError> {
        let metrics = Metrics::new();
        let backend = BackendClient::new(backend_url, backend_timeout, store.clone(), metrics.clone())?;
        let watcher = SessionWatcher::spawn(store.clone(), session_poll_interval);

        Ok(Self {
            store,
            backend,
            watcher,
            metrics,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let store: Arc<dyn SessionStore> = match &config.session_file {
            Some(path) => Arc::new(FileSessionStore::new(path, config.event_buffer_size)),
            None => Arc::new(MemorySessionStore::new(config.event_buffer_size)),
        };

        Self::new(
            store,
            &config.backend_url,
            config.backend_timeout(),
            config.session_poll_interval(),
        )
    }
}
