//! Integration tests for sync engine and server.

use padsync_engine::{
    ConflictPolicy, Identity, LoopbackTransport, SyncConfig, SyncEngine, SyncPhase,
};
use padsync_protocol::{SyncRequest, TransportResponse};
use padsync_server::{Document, PadServer, ServerConfig};
use padsync_store::{LocalRecord, LocalStore, MemoryStore, NoLocalStore};
use parking_lot::Mutex;
use std::sync::Arc;

type Results = Arc<Mutex<Vec<Option<String>>>>;

type Handler = Box<dyn Fn(&SyncRequest) -> TransportResponse + Send + Sync>;
type Loopback = LoopbackTransport<Handler>;

fn connect(server: &Arc<PadServer>) -> Loopback {
    let server = Arc::clone(server);
    let handler: Handler = Box::new(move |request: &SyncRequest| server.handle(request));
    LoopbackTransport::new(handler)
}

fn engine_for<S: LocalStore + 'static>(
    user: &str,
    server: &Arc<PadServer>,
    store: S,
) -> (SyncEngine<Loopback, S>, Results) {
    let results: Results = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&results);
    let engine = SyncEngine::new(
        SyncConfig::default(),
        &Identity::new(user),
        connect(server),
        store,
        move |content| sink.lock().push(content),
    )
    .unwrap();
    (engine, results)
}

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

#[test]
fn pull_then_push_round_trip() {
    let server = Arc::new(PadServer::new(ServerConfig::default()));
    server.seed("42", 3, "initial content");

    let (engine, results) = engine_for("42", &server, NoLocalStore);

    engine.sync(None);
    assert_eq!(engine.version(), 3);
    assert_eq!(engine.phase(), SyncPhase::Idle);

    engine.sync(some("edited content"));
    assert_eq!(engine.version(), 4);
    assert!(!engine.dirty());
    assert_eq!(*results.lock(), vec![some("initial content"), None]);
    assert_eq!(server.document("42"), Document::new(4, "edited content"));
}

#[test]
fn second_pull_returns_nothing_new() {
    let server = Arc::new(PadServer::default());
    server.seed("42", 2, "x");
    let (engine, results) = engine_for("42", &server, NoLocalStore);

    engine.sync(None);
    engine.sync(None);
    assert_eq!(*results.lock(), vec![some("x"), None]);
}

#[test]
fn two_clients_conflict_server_wins() {
    let server = Arc::new(PadServer::default());
    server.seed("42", 1, "base");

    let (alice, _) = engine_for("42", &server, NoLocalStore);
    let (bob, bob_results) = engine_for("42", &server, NoLocalStore);
    alice.sync(None);
    bob.sync(None);

    alice.sync(some("from alice"));
    assert_eq!(server.document("42").version, 2);

    bob.sync(some("from bob"));
    assert_eq!(bob_results.lock().last().cloned().flatten(), some("from alice"));
    assert_eq!(bob.version(), 2);
    assert!(!bob.dirty());
    assert_eq!(server.document("42").content, "from alice");
}

#[test]
fn two_clients_conflict_client_wins() {
    let server = Arc::new(PadServer::default());
    server.seed("42", 1, "base");

    let (alice, _) = engine_for("42", &server, NoLocalStore);
    let (bob, bob_results) = engine_for("42", &server, NoLocalStore);
    bob.set_conflict_source(ConflictPolicy::ClientWins);
    alice.sync(None);
    bob.sync(None);

    alice.sync(some("from alice"));
    bob.sync(some("from bob"));

    assert_eq!(server.document("42"), Document::new(3, "from bob"));
    assert_eq!(bob.version(), 3);
    assert_eq!(bob_results.lock().last().cloned().flatten(), None);
    assert_eq!(bob.stats().conflict_retries, 1);
}

#[test]
fn offline_edit_is_resubmitted_on_reconnect() {
    let server = Arc::new(PadServer::default());
    server.seed("42", 1, "base");
    let store = Arc::new(MemoryStore::with_record("42", LocalRecord::new(0, "")));
    let (engine, results) = engine_for("42", &server, Arc::clone(&store));

    engine.sync(None);
    assert_eq!(store.get("42").unwrap().unwrap(), LocalRecord::new(1, "base"));

    server.set_offline(true);
    engine.sync(some("written offline"));
    assert!(!engine.online());
    assert!(engine.dirty());

    let mirrored = store.get("42").unwrap().unwrap();
    assert!(mirrored.dirty);
    assert_eq!(mirrored.content, "written offline");

    server.set_offline(false);
    engine.sync(some("written offline"));
    assert!(engine.online());
    assert!(!engine.dirty());
    assert_eq!(engine.version(), 2);
    assert_eq!(server.document("42"), Document::new(2, "written offline"));
    assert_eq!(results.lock().last().cloned().flatten(), None);
}

#[test]
fn restart_resumes_from_mirror() {
    let server = Arc::new(PadServer::default());
    server.seed("42", 5, "server copy");
    let store = Arc::new(MemoryStore::with_record("42", LocalRecord::new(5, "server copy")));

    let (engine, results) = engine_for("42", &server, Arc::clone(&store));
    engine.sync(None);
    assert_eq!(*results.lock(), vec![some("server copy")]);

    server.set_offline(true);
    engine.sync(some("unsent"));
    drop(engine);

    server.set_offline(false);
    let (restarted, restarted_results) = engine_for("42", &server, Arc::clone(&store));
    assert!(restarted.local_mode());
    assert!(restarted.dirty());
    assert_eq!(restarted.version(), 5);

    // The first sync after a restart pulls and hands back the mirrored edit.
    restarted.sync(None);
    assert!(restarted.dirty());
    assert_eq!(*restarted_results.lock(), vec![some("unsent")]);

    restarted.sync(some("unsent"));
    assert!(!restarted.dirty());
    assert_eq!(restarted.version(), 6);
    assert_eq!(server.document("42"), Document::new(6, "unsent"));
    assert_eq!(store.get("42").unwrap().unwrap(), LocalRecord::new(6, "unsent"));
}

#[test]
fn rejected_requests_leave_state_untouched() {
    let server = Arc::new(PadServer::new(
        ServerConfig::default().with_max_content_len(8),
    ));
    server.seed("42", 1, "base");
    let (engine, results) = engine_for("42", &server, NoLocalStore);

    engine.sync(None);
    engine.sync(some("this edit is far too long"));

    assert!(!engine.online());
    assert!(engine.dirty());
    assert_eq!(engine.version(), 1);
    assert_eq!(results.lock().last().cloned().flatten(), None);
    assert!(engine.stats().last_error.unwrap().contains("413"));
}
