//! Simulate command implementation.

use padsync_engine::{
    ConflictPolicy, Identity, LoopbackTransport, SyncConfig, SyncEngine,
};
use padsync_protocol::{SyncRequest, TransportResponse};
use padsync_server::{PadServer, ServerConfig};
use padsync_store::{FileStore, LocalStore, NoLocalStore};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

type Handler = Box<dyn Fn(&SyncRequest) -> TransportResponse + Send + Sync>;

/// Options for a simulated editing session.
pub struct SimulateOptions {
    /// Session identity.
    pub identity: Identity,
    /// Version of the server document before the session.
    pub seed_version: u64,
    /// Content of the server document before the session.
    pub seed_content: String,
    /// Edits to sync, in order.
    pub edits: Vec<String>,
    /// Take the server offline before this edit.
    pub offline_from: Option<usize>,
    /// Keep local edits on conflict.
    pub client_wins: bool,
    /// Mirror directory, if the session should run in local mode.
    pub mirror: Option<PathBuf>,
}

/// One `sync()` call and what it produced.
#[derive(Debug, Serialize)]
pub struct Step {
    /// What the session did.
    pub action: String,
    /// Results delivered by the engine during this step.
    pub results: Vec<Option<String>>,
    /// Version after the step.
    pub version: u64,
    /// Dirty flag after the step.
    pub dirty: bool,
    /// Online flag after the step.
    pub online: bool,
}

/// Outcome of a simulated session.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    /// User id.
    pub user_id: String,
    /// Whether the engine ran in local mode.
    pub local_mode: bool,
    /// Steps in order.
    pub steps: Vec<Step>,
    /// Server document version after the session.
    pub server_version: u64,
    /// Server document content after the session.
    pub server_content: String,
    /// Requests the server received.
    pub requests: u64,
    /// Conflicts the engine detected.
    pub conflicts: u64,
}

/// Runs the simulate command.
pub fn run(options: SimulateOptions, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = match options.mirror.clone() {
        Some(path) => simulate(options, FileStore::open(&path)?)?,
        None => simulate(options, NoLocalStore)?,
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            print_text_output(&report);
        }
    }

    Ok(())
}

/// Drives one session against a fresh in-process server.
pub fn simulate<S: LocalStore + 'static>(
    options: SimulateOptions,
    store: S,
) -> Result<SimulationReport, Box<dyn std::error::Error>> {
    let server = Arc::new(PadServer::new(ServerConfig::default()));
    server.seed(
        options.identity.user_id.clone(),
        options.seed_version,
        options.seed_content.clone(),
    );

    let routed = Arc::clone(&server);
    let handler: Handler = Box::new(move |request: &SyncRequest| routed.handle(request));

    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delivered);
    let engine = SyncEngine::new(
        SyncConfig::default(),
        &options.identity,
        LoopbackTransport::new(handler),
        store,
        move |content| sink.lock().push(content),
    )?;
    if options.client_wins {
        engine.set_conflict_source(ConflictPolicy::ClientWins);
    }
    info!(
        user = %options.identity.user_id,
        local_mode = engine.local_mode(),
        edits = options.edits.len(),
        "simulating session"
    );

    let mut steps = Vec::new();
    let mut step = |action: String, update: Option<String>| {
        engine.sync(update);
        let state = engine.state();
        debug!(
            action = action.as_str(),
            version = state.version,
            dirty = state.dirty,
            online = state.online,
            "step done"
        );
        steps.push(Step {
            action,
            results: std::mem::take(&mut *delivered.lock()),
            version: state.version,
            dirty: state.dirty,
            online: state.online,
        });
    };

    step("initial sync".into(), None);
    for (i, edit) in options.edits.iter().enumerate() {
        if options.offline_from == Some(i) {
            debug!(edit = i, "server going offline");
            server.set_offline(true);
        }
        step(format!("edit {i}"), Some(edit.clone()));
    }

    if server.is_offline() {
        server.set_offline(false);
        let last = options.edits.last().cloned();
        step("reconnect".into(), last);
    }

    let document = server.document(&options.identity.user_id);
    info!(
        server_version = document.version,
        requests = server.request_count(),
        "session finished"
    );
    Ok(SimulationReport {
        user_id: options.identity.user_id.clone(),
        local_mode: engine.local_mode(),
        steps,
        server_version: document.version,
        server_content: document.content,
        requests: server.request_count(),
        conflicts: engine.stats().conflicts,
    })
}

fn print_text_output(report: &SimulationReport) {
    println!(
        "User {} ({})",
        report.user_id,
        if report.local_mode { "local mode" } else { "server mode" }
    );
    println!();

    for step in &report.steps {
        println!(
            "{:<14} version={:<4} dirty={:<5} online={}",
            step.action, step.version, step.dirty, step.online
        );
        for result in &step.results {
            match result {
                Some(content) => println!("  -> {content:?}"),
                None => println!("  -> (nothing)"),
            }
        }
    }

    println!();
    println!("Server: version {} {:?}", report.server_version, report.server_content);
    println!("Requests: {}", report.requests);
    println!("Conflicts: {}", report.conflicts);
}
