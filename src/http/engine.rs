//! The HTTP engine seam.

use super::request::{HttpRequest, RequestOutcome};

/// Callback receiving the terminal outcome of a request.
pub type Completion = Box<dyn FnOnce(RequestOutcome) + Send + 'static>;

/// Performs HTTP requests on behalf of the transport.
///
/// `send` must not block: it starts the request and returns. The completion
/// is invoked exactly once, possibly on another thread, when the request
/// reaches a terminal state. Implementations must not hold internal locks
/// while invoking the completion, because the transport may issue the next
/// request from inside it.
pub trait HttpEngine: Send + Sync + 'static {
    /// Start `request` and report its outcome to `on_complete`.
    fn send(&self, request: HttpRequest, on_complete: Completion);
}

impl<E: HttpEngine + ?Sized> HttpEngine for std::sync::Arc<E> {
    fn send(&self, request: HttpRequest, on_complete: Completion) {
        (**self).send(request, on_complete)
    }
}
