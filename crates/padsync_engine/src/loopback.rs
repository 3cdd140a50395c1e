//! Loopback transport routing requests to an in-process server.

use crate::transport::{Cancellable, CompletionCallback, NoopCancel, Transport};
use padsync_protocol::{SyncRequest, TransportResponse};
use std::sync::atomic::{AtomicU64, Ordering};

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer: Send + Sync {
    /// Handles a request and returns the response.
    fn handle(&self, request: &SyncRequest) -> TransportResponse;
}

impl<F> LoopbackServer for F
where
    F: Fn(&SyncRequest) -> TransportResponse + Send + Sync,
{
    fn handle(&self, request: &SyncRequest) -> TransportResponse {
        self(request)
    }
}

/// A transport that hands requests directly to a server in the same process.
///
/// Completions run synchronously, before `request` returns. Useful for
/// testing and for the command-line simulator without network overhead.
pub struct LoopbackTransport<S: LoopbackServer> {
    server: S,
    requests: AtomicU64,
}

impl<S: LoopbackServer> LoopbackTransport<S> {
    /// Creates a new loopback transport connected to the given server.
    pub fn new(server: S) -> Self {
        Self {
            server,
            requests: AtomicU64::new(0),
        }
    }

    /// Returns the number of requests routed so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

impl<S: LoopbackServer> Transport for LoopbackTransport<S> {
    fn request(&self, request: SyncRequest, on_complete: CompletionCallback) -> Box<dyn Cancellable> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let response = self.server.handle(&request);
        on_complete(response);
        Box::new(NoopCancel)
    }
}
