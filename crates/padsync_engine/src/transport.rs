//! Transport layer abstraction for sync requests.

use padsync_protocol::{SyncRequest, TransportResponse};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Continuation invoked once when a request completes.
pub type CompletionCallback = Box<dyn FnOnce(TransportResponse) + Send>;

/// Handle for an outstanding request.
///
/// Cancellation is best effort: the transport may keep the I/O running and
/// may even still invoke the completion. The engine ignores such
/// completions on its own.
pub trait Cancellable: Send {
    /// Asks the transport to abandon the request.
    fn cancel(&self);
}

/// A sync transport issues single, cancellable HTTP-like requests.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP client, loopback to an in-process server, mock for
/// testing). The completion may run synchronously inside `request` or later
/// on any thread.
pub trait Transport: Send + Sync {
    /// Starts a request and returns its cancellation handle.
    fn request(&self, request: SyncRequest, on_complete: CompletionCallback) -> Box<dyn Cancellable>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn request(&self, request: SyncRequest, on_complete: CompletionCallback) -> Box<dyn Cancellable> {
        (**self).request(request, on_complete)
    }
}

/// A shareable cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once `cancel` has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Cancellable for CancelToken {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Handle for requests that cannot be aborted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCancel;

impl Cancellable for NoopCancel {
    fn cancel(&self) {}
}

struct MockCall {
    request: SyncRequest,
    completion: Option<CompletionCallback>,
    token: CancelToken,
}

/// A mock transport for testing.
///
/// Records every request and holds its completion until the test completes
/// it explicitly, in any order. Completing a cancelled request still runs
/// its completion, the way a transport that cannot abort I/O would.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<MockCall>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all requests issued so far.
    pub fn requests(&self) -> Vec<SyncRequest> {
        self.calls.lock().iter().map(|c| c.request.clone()).collect()
    }

    /// Returns the number of requests issued so far.
    pub fn request_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the most recent request.
    pub fn last_request(&self) -> Option<SyncRequest> {
        self.calls.lock().last().map(|c| c.request.clone())
    }

    /// Returns true if the request at `index` was cancelled.
    pub fn is_cancelled(&self, index: usize) -> bool {
        self.calls
            .lock()
            .get(index)
            .is_some_and(|c| c.token.is_cancelled())
    }

    /// Returns the number of requests not yet completed.
    pub fn pending_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.completion.is_some())
            .count()
    }

    /// Completes the request at `index`.
    ///
    /// Returns false if there is no such request or it was already completed.
    pub fn complete(&self, index: usize, response: TransportResponse) -> bool {
        // Release the lock first: the completion may issue a new request.
        let completion = self
            .calls
            .lock()
            .get_mut(index)
            .and_then(|c| c.completion.take());

        match completion {
            Some(completion) => {
                completion(response);
                true
            }
            None => false,
        }
    }

    /// Completes the most recent request.
    pub fn complete_last(&self, response: TransportResponse) -> bool {
        let count = self.request_count();
        count > 0 && self.complete(count - 1, response)
    }
}

impl Transport for MockTransport {
    fn request(&self, request: SyncRequest, on_complete: CompletionCallback) -> Box<dyn Cancellable> {
        let token = CancelToken::new();
        self.calls.lock().push(MockCall {
            request,
            completion: Some(on_complete),
            token: token.clone(),
        });
        Box::new(token)
    }
}
