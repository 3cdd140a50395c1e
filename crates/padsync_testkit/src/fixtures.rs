//! Test fixtures and session helpers.
//!
//! Provides result recorders, engines wired to an in-process server and
//! file mirrors in temporary directories.

use padsync_engine::{Identity, LoopbackTransport, SyncConfig, SyncEngine};
use padsync_protocol::{SyncRequest, TransportResponse};
use padsync_server::{PadServer, ServerConfig};
use padsync_store::{FileStore, LocalRecord, MemoryStore};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Records every result an engine delivers.
#[derive(Clone, Default)]
pub struct RecordingSink {
    results: Arc<Mutex<Vec<Option<String>>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a result callback feeding this sink.
    pub fn callback(&self) -> impl Fn(Option<String>) + Send + Sync + 'static {
        let results = Arc::clone(&self.results);
        move |content| results.lock().push(content)
    }

    /// Returns all results delivered so far.
    pub fn results(&self) -> Vec<Option<String>> {
        self.results.lock().clone()
    }

    /// Removes and returns all results delivered so far.
    pub fn take(&self) -> Vec<Option<String>> {
        std::mem::take(&mut *self.results.lock())
    }

    /// Returns the content of the most recent result, if it carried any.
    pub fn last(&self) -> Option<String> {
        self.results.lock().last().cloned().flatten()
    }

    /// Returns the number of results delivered.
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Returns true if no result was delivered.
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}

/// Request handler routing to an in-process server.
pub type LoopbackHandler = Box<dyn Fn(&SyncRequest) -> TransportResponse + Send + Sync>;

/// Engine talking to an in-process server through a memory mirror.
pub type SessionEngine = SyncEngine<LoopbackTransport<LoopbackHandler>, Arc<MemoryStore>>;

/// Creates a loopback transport connected to `server`.
pub fn loopback_to(server: &Arc<PadServer>) -> LoopbackTransport<LoopbackHandler> {
    let server = Arc::clone(server);
    let handler: LoopbackHandler = Box::new(move |request: &SyncRequest| server.handle(request));
    LoopbackTransport::new(handler)
}

/// A sync engine wired to an in-process server.
pub struct Session {
    /// The server.
    pub server: Arc<PadServer>,
    /// The engine.
    pub engine: SessionEngine,
    /// The engine's local store.
    pub store: Arc<MemoryStore>,
    /// Results delivered by the engine.
    pub sink: RecordingSink,
    user_id: String,
    config: SyncConfig,
}

impl Session {
    /// A server-mode session against a fresh server.
    pub fn online(user_id: &str) -> Self {
        Self::with_server(
            user_id,
            Arc::new(PadServer::new(ServerConfig::default())),
            MemoryStore::new(),
            SyncConfig::default(),
        )
    }

    /// A local-mode session starting from `record`.
    pub fn local(user_id: &str, record: LocalRecord) -> Self {
        Self::with_server(
            user_id,
            Arc::new(PadServer::new(ServerConfig::default())),
            MemoryStore::with_record(user_id, record),
            SyncConfig::default(),
        )
    }

    /// A session against an existing server.
    pub fn with_server(
        user_id: &str,
        server: Arc<PadServer>,
        store: MemoryStore,
        config: SyncConfig,
    ) -> Self {
        Self::build(user_id, server, Arc::new(store), config)
    }

    /// A second client for the same user on the same server.
    pub fn another_client(&self) -> Self {
        Self::with_server(
            &self.user_id,
            Arc::clone(&self.server),
            MemoryStore::new(),
            self.config.clone(),
        )
    }

    /// Drops the engine and starts a new one over the same server and store.
    pub fn restart(self) -> Self {
        let Session {
            server,
            engine,
            store,
            user_id,
            config,
            ..
        } = self;
        drop(engine);
        Self::build(&user_id, server, store, config)
    }

    fn build(
        user_id: &str,
        server: Arc<PadServer>,
        store: Arc<MemoryStore>,
        config: SyncConfig,
    ) -> Self {
        let sink = RecordingSink::new();
        let engine = SyncEngine::new(
            config.clone(),
            &Identity::new(user_id),
            loopback_to(&server),
            Arc::clone(&store),
            sink.callback(),
        )
        .expect("Failed to create sync engine");

        Self {
            server,
            engine,
            store,
            sink,
            user_id: user_id.to_string(),
            config,
        }
    }

    /// The session's user id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// A file mirror in a temporary directory.
pub struct TestMirror {
    /// The store.
    pub store: FileStore,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestMirror {
    /// Creates an empty mirror.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::open(temp_dir.path()).expect("Failed to open file store");
        Self {
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the mirror directory.
    pub fn path(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Closes and reopens the store over the same directory.
    pub fn reopen(self) -> Self {
        let TestMirror { store, _temp_dir } = self;
        drop(store);
        let store = FileStore::open(_temp_dir.path()).expect("Failed to reopen file store");
        Self { store, _temp_dir }
    }
}

impl Default for TestMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestMirror {
    type Target = FileStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padsync_store::LocalStore;

    #[test]
    fn sink_records_results() {
        let sink = RecordingSink::new();
        let callback = sink.callback();
        callback(Some("a".into()));
        callback(None);

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.last(), None);
        assert_eq!(sink.take(), vec![Some("a".to_string()), None]);
        assert!(sink.is_empty());
    }

    #[test]
    fn session_round_trip() {
        let session = Session::online("42");
        session.server.seed("42", 3, "initial content");

        session.engine.sync(None);
        assert_eq!(session.sink.last(), Some("initial content".to_string()));
        assert_eq!(session.engine.version(), 3);
    }

    #[test]
    fn restart_keeps_store() {
        let session = Session::local("42", LocalRecord::new(0, ""));
        session.server.seed("42", 2, "server");
        session.engine.sync(None);

        let restarted = session.restart();
        assert_eq!(restarted.engine.version(), 2);
        assert!(restarted.engine.local_mode());
        assert!(restarted.sink.is_empty());
    }

    #[test]
    fn mirror_reopen() {
        let mirror = TestMirror::new();
        assert!(mirror.register("42", LocalRecord::new(1, "x")).unwrap());

        let mirror = mirror.reopen();
        assert_eq!(mirror.get("42").unwrap(), Some(LocalRecord::new(1, "x")));
        assert!(mirror.path().exists());
    }
}
