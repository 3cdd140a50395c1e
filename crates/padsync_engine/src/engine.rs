//! Sync engine state machine.

use crate::config::SyncConfig;
use crate::decision::ConflictDecisionSource;
use crate::error::{SyncError, SyncResult};
use crate::identity::{Identity, IdentityProvider};
use crate::state::{SyncPhase, SyncState, SyncStats};
use crate::transport::{Cancellable, Transport};
use padsync_protocol::{
    parse_response, Conflict, ConflictPolicy, ProtocolResult, ServerResponse, SyncRequest,
    TransportResponse, USER_HEADER,
};
use padsync_store::{LocalStore, RecordPatch};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Receives the reconciled content (or `None`) once per non-superseded
/// request.
pub type ResultCallback = Arc<dyn Fn(Option<String>) + Send + Sync>;

struct EngineState {
    version: u64,
    dirty: bool,
    online: bool,
    local_mode: bool,
    first_run: bool,
    phase: SyncPhase,
    /// Generation of the most recently issued request.
    generation: u64,
    /// Generation of the request still awaiting its completion, if any.
    in_flight: Option<u64>,
}

struct PendingRequest {
    generation: u64,
    handle: Box<dyn Cancellable>,
}

/// Everything a completion needs to finish its request.
struct RequestContext {
    generation: u64,
    push: bool,
    client_update: Option<String>,
    attempt: u32,
}

struct EngineCore<T: Transport, S: LocalStore> {
    config: SyncConfig,
    identity: Identity,
    transport: T,
    store: S,
    decisions: RwLock<Arc<dyn ConflictDecisionSource>>,
    on_result: ResultCallback,
    state: Mutex<EngineState>,
    /// Orders mirror writes with generation changes. Taken before `state`.
    local_writes: ReentrantMutex<()>,
    pending: Mutex<Option<PendingRequest>>,
    stats: RwLock<SyncStats>,
}

/// The sync engine reconciles one user's record with the server.
///
/// Cloning the engine yields another handle to the same engine. Dropping
/// every handle makes outstanding completions no-ops.
///
/// # Example
///
/// ```rust
/// use padsync_engine::{Identity, MockTransport, SyncConfig, SyncEngine};
/// use padsync_protocol::TransportResponse;
/// use padsync_store::NoLocalStore;
/// use std::sync::{Arc, Mutex};
///
/// let transport = Arc::new(MockTransport::new());
/// let shown = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&shown);
///
/// let engine = SyncEngine::new(
///     SyncConfig::default(),
///     &Identity::new("42"),
///     Arc::clone(&transport),
///     NoLocalStore,
///     move |content| sink.lock().unwrap().push(content),
/// )
/// .unwrap();
///
/// engine.sync(None);
/// transport.complete_last(TransportResponse::ok("3\ninitial content"));
///
/// assert_eq!(engine.version(), 3);
/// assert_eq!(*shown.lock().unwrap(), vec![Some("initial content".to_string())]);
/// ```
pub struct SyncEngine<T: Transport + 'static, S: LocalStore + 'static> {
    core: Arc<EngineCore<T, S>>,
}

impl<T: Transport + 'static, S: LocalStore + 'static> Clone for SyncEngine<T, S> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Transport + 'static, S: LocalStore + 'static> SyncEngine<T, S> {
    /// Creates a new sync engine.
    ///
    /// Conflicts are resolved with `ConflictPolicy::ServerWins` until
    /// `set_conflict_source` installs another decision source.
    ///
    /// # Errors
    ///
    /// - `IdentityUnresolved` if the identity provider cannot name a user
    /// - `Store` if the local store is available but cannot be read
    pub fn new<I, F>(
        config: SyncConfig,
        identity: &I,
        transport: T,
        store: S,
        on_result: F,
    ) -> SyncResult<Self>
    where
        I: IdentityProvider + ?Sized,
        F: Fn(Option<String>) + Send + Sync + 'static,
    {
        let identity = identity.resolve()?;

        let record = if store.is_available() {
            store.get(&identity.user_id)?
        } else {
            None
        };
        let local_mode = record.is_some();
        let (version, dirty) = record.map_or((0, false), |r| (r.version, r.dirty));

        debug!(
            user = %identity.user_id,
            local_mode,
            version,
            dirty,
            "sync engine created"
        );

        let state = EngineState {
            version,
            dirty,
            online: true,
            local_mode,
            first_run: true,
            phase: SyncPhase::Idle,
            generation: 0,
            in_flight: None,
        };

        Ok(Self {
            core: Arc::new(EngineCore {
                config,
                identity,
                transport,
                store,
                decisions: RwLock::new(Arc::new(ConflictPolicy::ServerWins)),
                on_result: Arc::new(on_result),
                state: Mutex::new(state),
                local_writes: ReentrantMutex::new(()),
                pending: Mutex::new(None),
                stats: RwLock::new(SyncStats::default()),
            }),
        })
    }

    /// Sets the conflict decision source.
    pub fn set_conflict_source(&self, source: impl ConflictDecisionSource + 'static) {
        *self.core.decisions.write() = Arc::new(source);
    }

    /// Sets the conflict decision source, builder style.
    pub fn with_conflict_source(self, source: impl ConflictDecisionSource + 'static) -> Self {
        self.set_conflict_source(source);
        self
    }

    /// Synchronizes with the server.
    ///
    /// `Some(update)` records a new local edit. `None` asks for whatever the
    /// server has, or re-pushes an edit that is still unconfirmed. A call
    /// made while another request is outstanding supersedes it.
    pub fn sync(&self, client_update: Option<String>) {
        EngineCore::start(&self.core, client_update, 0);
    }

    /// Abandons the outstanding request without issuing a new one.
    ///
    /// Its completion, if it ever arrives, is discarded and produces no
    /// result.
    pub fn cancel(&self) {
        let outstanding = {
            let mut state = self.core.state.lock();
            state.generation += 1;
            state.phase = SyncPhase::Idle;
            state.in_flight.take()
        };
        if let Some(generation) = outstanding {
            self.core.cancel_pending(generation);
        }
    }

    /// Returns a snapshot of the reconciliation state.
    pub fn state(&self) -> SyncState {
        let state = self.core.state.lock();
        SyncState {
            version: state.version,
            dirty: state.dirty,
            online: state.online,
            local_mode: state.local_mode,
            first_run: state.first_run,
            phase: state.phase,
        }
    }

    /// Last version known to match the server.
    pub fn version(&self) -> u64 {
        self.core.state.lock().version
    }

    /// True if an edit awaits server confirmation.
    pub fn dirty(&self) -> bool {
        self.core.state.lock().dirty
    }

    /// Last observed reachability of the server.
    pub fn online(&self) -> bool {
        self.core.state.lock().online
    }

    /// True if a local mirror backs this session.
    pub fn local_mode(&self) -> bool {
        self.core.state.lock().local_mode
    }

    /// Current phase.
    pub fn phase(&self) -> SyncPhase {
        self.core.state.lock().phase
    }

    /// True if a request is awaiting its completion.
    pub fn has_pending_request(&self) -> bool {
        self.core.state.lock().in_flight.is_some()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.core.stats.read().clone()
    }

    /// The resolved identity.
    pub fn identity(&self) -> &Identity {
        &self.core.identity
    }

    /// The engine configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.core.config
    }
}

impl<T: Transport + 'static, S: LocalStore + 'static> EngineCore<T, S> {
    fn start(core: &Arc<Self>, client_update: Option<String>, attempt: u32) {
        let writes = core.local_writes.lock();
        let (request, context, superseded, local_mode) = {
            let mut state = core.state.lock();
            if client_update.is_some() {
                state.dirty = true;
            }

            // Once the first decision is made, an unconfirmed edit is pushed
            // before anything is pulled over it.
            let push = !state.first_run && state.dirty;
            state.first_run = false;

            state.generation += 1;
            let generation = state.generation;
            let superseded = state.in_flight.replace(generation);
            state.phase = if push {
                SyncPhase::Pushing
            } else {
                SyncPhase::Pulling
            };

            let request = if push {
                SyncRequest::push(&core.config.update_path, state.version, client_update.clone())
            } else {
                SyncRequest::pull(&core.config.sync_path, state.version)
            }
            .with_header(USER_HEADER, core.identity.user_id.clone());

            let context = RequestContext {
                generation,
                push,
                client_update,
                attempt,
            };
            (request, context, superseded, state.local_mode)
        };

        if local_mode {
            if let Some(update) = &context.client_update {
                core.write_local(RecordPatch::new().dirty(true).content(update.clone()));
            }
        }
        drop(writes);

        if let Some(previous) = superseded {
            core.cancel_pending(previous);
        }

        {
            let mut stats = core.stats.write();
            if context.push {
                stats.pushes += 1;
            } else {
                stats.pulls += 1;
            }
        }

        let generation = context.generation;
        debug!(%request, generation, attempt, "issuing request");

        let weak = Arc::downgrade(core);
        let handle = core.transport.request(
            request,
            Box::new(move |response| {
                if let Some(core) = weak.upgrade() {
                    Self::complete(&core, context, response);
                }
            }),
        );

        let mut pending = core.pending.lock();
        let current = core.state.lock().generation == generation;
        if current {
            *pending = Some(PendingRequest { generation, handle });
        } else {
            // Superseded while the transport was still issuing it.
            handle.cancel();
        }
    }

    fn cancel_pending(&self, generation: u64) {
        let previous = self.pending.lock().take();
        if let Some(previous) = previous {
            if previous.generation == generation {
                previous.handle.cancel();
                self.stats.write().cancelled_requests += 1;
                debug!(generation, "cancelled outstanding request");
            }
        }
    }

    fn complete(core: &Arc<Self>, context: RequestContext, response: TransportResponse) {
        let (parsed, local_mode) = {
            let mut state = core.state.lock();
            if state.generation != context.generation {
                drop(state);
                core.discard_superseded(context.generation);
                return;
            }

            state.in_flight = None;
            state.phase = SyncPhase::Idle;
            let parsed = parse_response(&response, core.config.success_status);
            state.online = !matches!(&parsed, Err(e) if e.is_offline());
            (parsed, state.local_mode)
        };

        debug!(
            status = ?response.status,
            status_text = %response.status_text,
            body_len = response.body.len(),
            "got response"
        );

        if context.push {
            Self::finish_push(core, context, parsed, local_mode);
        } else {
            core.finish_pull(context.generation, parsed, local_mode);
        }
    }

    // The store, the decision source and the result callback may all start
    // a newer request, so every step after one of them re-checks that this
    // response is still current.
    fn finish_push(
        core: &Arc<Self>,
        context: RequestContext,
        parsed: ProtocolResult<ServerResponse>,
        local_mode: bool,
    ) {
        let generation = context.generation;
        let response = match parsed {
            Ok(response) => response,
            Err(e) => {
                core.record_failure(e.into());
                core.report_if_current(generation, None);
                return;
            }
        };

        // Content coming back from a push that carried an edit means the
        // server did not take the edit as a plain update.
        if let (Some(edit), Some(remote)) = (&context.client_update, &response.content) {
            core.stats.write().conflicts += 1;
            let conflict = Conflict::new(edit.clone(), remote.clone(), response.version);
            let source = Arc::clone(&*core.decisions.read());
            let resolution = source.resolve(&conflict);
            debug!(?resolution, remote_version = ?response.version, "push conflicted");

            if resolution.overrides_remote() {
                if context.attempt >= core.config.max_conflict_retries {
                    if !core.is_current(generation) {
                        return;
                    }
                    core.record_failure(SyncError::ConflictRetryLimit {
                        attempts: context.attempt,
                    });
                    core.report_if_current(generation, None);
                    return;
                }

                let adopted = core.update_if_current(generation, |state| {
                    if let Some(version) = response.version {
                        state.version = version;
                    }
                });
                if !adopted {
                    return;
                }
                core.stats.write().conflict_retries += 1;
                Self::start(core, context.client_update, context.attempt + 1);
                return;
            }
        }

        if local_mode {
            let patch = RecordPatch::new()
                .dirty(false)
                .maybe_version(response.version)
                .maybe_content(response.content.clone());
            if !core.write_local_if_current(generation, patch) {
                return;
            }
        }

        let confirmed = core.update_if_current(generation, |state| {
            state.dirty = false;
            if let Some(version) = response.version {
                state.version = version;
            }
        });
        if !confirmed {
            return;
        }

        core.record_success();
        core.report_if_current(generation, response.content);
    }

    fn finish_pull(
        &self,
        generation: u64,
        parsed: ProtocolResult<ServerResponse>,
        local_mode: bool,
    ) {
        let response = match parsed {
            Ok(response) => response,
            Err(e) => {
                self.record_failure(e.into());
                let fallback = if local_mode && self.config.offline_fallback {
                    self.read_local_content()
                } else {
                    None
                };
                self.report_if_current(generation, fallback);
                return;
            }
        };

        self.record_success();
        match response.content {
            Some(content) => {
                if local_mode {
                    let patch = RecordPatch::new()
                        .maybe_version(response.version)
                        .content(content.clone());
                    if !self.write_local_if_current(generation, patch) {
                        return;
                    }
                }
                let adopted = self.update_if_current(generation, |state| {
                    if let Some(version) = response.version {
                        state.version = version;
                    }
                });
                if adopted {
                    self.report_if_current(generation, Some(content));
                }
            }
            // Nothing newer on the server.
            None if local_mode => {
                let cached = self.read_local_content();
                self.report_if_current(generation, cached);
            }
            None => self.report_if_current(generation, None),
        }
    }

    /// Applies `update` if `generation` is still the newest request.
    ///
    /// Returns false, and counts the response as superseded, otherwise.
    fn update_if_current(&self, generation: u64, update: impl FnOnce(&mut EngineState)) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            drop(state);
            self.discard_superseded(generation);
            return false;
        }
        update(&mut state);
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        self.update_if_current(generation, |_| {})
    }

    fn discard_superseded(&self, generation: u64) {
        self.stats.write().superseded_responses += 1;
        debug!(generation, "discarding superseded response");
    }

    /// Writes `patch` to the mirror unless a newer request has started.
    ///
    /// A newer request's write-through always lands after this write.
    fn write_local_if_current(&self, generation: u64, patch: RecordPatch) -> bool {
        let _writes = self.local_writes.lock();
        if !self.is_current(generation) {
            return false;
        }
        self.write_local(patch);
        true
    }

    fn write_local(&self, patch: RecordPatch) {
        if let Err(e) = self.store.set(&self.identity.user_id, patch) {
            warn!(user = %self.identity.user_id, error = %e, "failed to update local record");
            self.stats.write().last_error = Some(SyncError::from(e).to_string());
        }
    }

    fn read_local_content(&self) -> Option<String> {
        match self.store.get(&self.identity.user_id) {
            Ok(record) => record.map(|r| r.content),
            Err(e) => {
                warn!(user = %self.identity.user_id, error = %e, "failed to read local record");
                self.stats.write().last_error = Some(SyncError::from(e).to_string());
                None
            }
        }
    }

    fn record_failure(&self, error: SyncError) {
        warn!(error = %error, "sync failed");
        let mut stats = self.stats.write();
        stats.failures += 1;
        stats.last_error = Some(error.to_string());
    }

    fn record_success(&self) {
        let mut stats = self.stats.write();
        stats.last_sync_time = Some(Instant::now());
        stats.last_error = None;
    }

    fn report_if_current(&self, generation: u64, content: Option<String>) {
        if !self.is_current(generation) {
            return;
        }
        self.stats.write().results_reported += 1;
        (self.on_result)(content);
    }
}
