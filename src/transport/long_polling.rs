//! Long-polling transport.
//!
//! Emulates a bidirectional stream with sequential HTTP cycles:
//!
//! - **Handshake**: `POST` with the protocol envelope
//! - **Send**: `POST` with every queued frame, at most one in flight
//! - **Poll**: `GET` held open by the server, re-issued after every response
//! - **Close**: `DELETE`, racing the outstanding poll
//!
//! Completions arrive from the engine on arbitrary threads; all shared state
//! is either atomic, behind a short lock, or owned by the send gate holder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use bytes::Bytes;
use crossbeam_queue::SegQueue;
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use super::outbox::Outbox;
use super::state::{Action, Event, Step, TransportState, transition};
use crate::config::TransportConfig;
use crate::core::constants::{
    CONNECTION_ID_PARAM, STATUS_BAD_REQUEST, STATUS_NO_CONTENT, STATUS_NOT_FOUND, STATUS_OK,
};
use crate::core::{HubConnection, TransportError};
use crate::http::{
    HttpEngine, HttpMethod, HttpRequest, RequestContext, RequestKind, RequestOutcome, RetryPolicy,
};
use crate::protocol::HandshakeRequest;

/// State plus the reason it failed, changed together.
#[derive(Debug)]
struct Status {
    state: TransportState,
    error: Option<TransportError>,
}

/// State changes waiting to reach the hub, in transition order.
#[derive(Default)]
struct Notifications {
    queue: SegQueue<(TransportState, TransportState)>,
    delivering: AtomicBool,
}

/// Long-polling transport owned by a hub connection.
///
/// Cloning yields another handle to the same transport.
///
/// # Example
///
/// ```ignore
/// let engine = ReqwestEngine::current()?;
/// let transport = LongPollingTransport::new(hub.clone(), engine, TransportConfig::default());
///
/// transport.start_connect();
/// // ... once connected:
/// transport.send(b"{\"type\":1,\"target\":\"chat\",\"arguments\":[\"hi\"]}\x1e".to_vec());
/// // ... later:
/// transport.start_close();
/// ```
pub struct LongPollingTransport<H: HubConnection, E: HttpEngine> {
    shared: Arc<Shared<H, E>>,
}

impl<H: HubConnection, E: HttpEngine> Clone for LongPollingTransport<H, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<H: HubConnection, E: HttpEngine> std::fmt::Debug for LongPollingTransport<H, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LongPollingTransport")
            .field("state", &self.state())
            .field("pending_frames", &self.pending_frames())
            .field("sending", &self.is_sending())
            .finish()
    }
}

struct Shared<H: HubConnection, E: HttpEngine> {
    hub: Arc<H>,
    engine: E,
    config: TransportConfig,
    retry: RetryPolicy,
    status: Mutex<Status>,
    notifications: Notifications,
    outbox: Outbox,
}

impl<H: HubConnection, E: HttpEngine> LongPollingTransport<H, E> {
    /// Create a transport in the `Initial` state.
    pub fn new(hub: Arc<H>, engine: E, config: TransportConfig) -> Self {
        let retry = config.retry_policy();
        Self {
            shared: Arc::new(Shared {
                hub,
                engine,
                config,
                retry,
                status: Mutex::new(Status {
                    state: TransportState::Initial,
                    error: None,
                }),
                notifications: Notifications::default(),
                outbox: Outbox::new(),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> TransportState {
        self.shared.state()
    }

    /// The error that moved the transport into `Failed`.
    pub fn error(&self) -> Option<TransportError> {
        self.shared.status.lock().error.clone()
    }

    /// Human-readable reason for `Failed`.
    pub fn error_reason(&self) -> Option<String> {
        self.shared
            .status
            .lock()
            .error
            .as_ref()
            .map(ToString::to_string)
    }

    /// Frames enqueued but not yet part of a send request.
    pub fn pending_frames(&self) -> usize {
        self.shared.outbox.len()
    }

    /// Check if a send request is in flight.
    pub fn is_sending(&self) -> bool {
        self.shared.outbox.is_sending()
    }

    /// The owning hub connection.
    pub fn hub(&self) -> &Arc<H> {
        &self.shared.hub
    }

    /// The transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.shared.config
    }

    /// Start the handshake. Ignored unless the transport is `Initial`.
    pub fn start_connect(&self) {
        let action = self.shared.fire(Event::StartConnect, None);
        self.shared.perform(action);
    }

    /// Queue `frame` for delivery. Ignored unless the transport is `Connected`.
    ///
    /// Never blocks: if a send request is already in flight, the frame goes
    /// out with the next one.
    pub fn send(&self, frame: impl Into<Bytes>) {
        if self.shared.state() != TransportState::Connected {
            trace!("send ignored, transport not connected");
            return;
        }
        self.shared.outbox.enqueue(frame.into());
        self.shared.pump_sends();
    }

    /// Start a graceful close. Ignored unless the transport is `Connected`.
    pub fn start_close(&self) {
        let action = self.shared.fire(Event::StartClose, None);
        self.shared.perform(action);
    }
}

impl<H: HubConnection, E: HttpEngine> Shared<H, E> {
    fn state(&self) -> TransportState {
        self.status.lock().state
    }

    /// Apply `event` through the transition table and return the follow-up action.
    ///
    /// `error` is recorded only when the event moves the transport into `Failed`.
    fn fire(&self, event: Event, error: Option<TransportError>) -> Action {
        let (step, old, reason) = {
            let mut status = self.status.lock();
            let old = status.state;
            let step = transition(old, event);
            let mut reason = None;
            if let Step::Enter(new, _) = step {
                status.state = new;
                if new == TransportState::Failed {
                    if status.error.is_none() {
                        status.error = error;
                    }
                    reason = status.error.as_ref().map(ToString::to_string);
                }
                self.notifications.queue.push((old, new));
            }
            (step, old, reason)
        };

        match step {
            Step::Ignore => {
                trace!(state = %old, ?event, "event ignored");
            }
            Step::Stay(_) => {}
            Step::Enter(new, _) => {
                if new == TransportState::Failed {
                    error!(from = %old, ?event, reason = reason.as_deref().unwrap_or(""), "transport failed");
                } else {
                    info!(from = %old, to = %new, ?event, "transport state changed");
                }
                self.notify_hub();
            }
        }

        step.action()
    }

    /// Deliver queued state changes to the hub, one thread at a time.
    ///
    /// Changes are queued under the status lock, so the hub sees them in
    /// transition order. A change queued while another thread is delivering
    /// is handed to that thread. Hub callbacks run with no transport lock held.
    fn notify_hub(&self) {
        let pending = &self.notifications;
        loop {
            if pending
                .delivering
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }

            while let Some((old, new)) = pending.queue.pop() {
                self.hub.on_state_changed(old, new);
            }

            pending.delivering.store(false, Ordering::Release);
            if pending.queue.is_empty() {
                return;
            }
        }
    }

    fn perform(self: &Arc<Self>, action: Action) {
        match action {
            Action::Nothing => {}
            Action::Handshake => self.handshake(),
            Action::BeginStreaming => {
                self.pump_sends();
                self.poll();
            }
            Action::DispatchAndPoll | Action::Poll => self.poll(),
            Action::Delete => self.send_close(RequestContext::first(RequestKind::Close)),
        }
    }

    fn endpoint(&self) -> Url {
        let mut uri = self.hub.uri().clone();
        if let Some(id) = self.hub.connection_id() {
            uri.query_pairs_mut().append_pair(CONNECTION_ID_PARAM, id);
        }
        uri
    }

    fn request(&self, method: HttpMethod) -> HttpRequest {
        let mut request = HttpRequest::new(method, self.endpoint());
        request.timeout = self.config.request_timeout;
        request
    }

    /// Adorn and hand `request` to the engine; `on_done` runs on completion.
    fn issue<F>(self: &Arc<Self>, mut request: HttpRequest, ctx: RequestContext, on_done: F)
    where
        F: FnOnce(&Arc<Self>, RequestContext, RequestOutcome) + Send + 'static,
    {
        for (name, value) in &self.config.extra_headers {
            request.set_header(name.as_str(), value.as_str());
        }
        if let Some(auth) = self.hub.authentication() {
            auth.prepare_request(&mut request);
        }

        debug!(kind = %ctx.kind, retries = ctx.retries, method = %request.method, "issuing request");

        let weak: Weak<Self> = Arc::downgrade(self);
        self.engine.send(
            request,
            Box::new(move |outcome: RequestOutcome| match weak.upgrade() {
                Some(shared) => on_done(&shared, ctx, outcome),
                None => trace!(kind = %ctx.kind, "transport dropped before completion"),
            }),
        );
    }

    // --- handshake -----------------------------------------------------------

    fn handshake(self: &Arc<Self>) {
        info!(uri = %self.hub.uri(), protocol = self.hub.protocol_name(), "starting connect");

        let envelope =
            match HandshakeRequest::new(self.hub.protocol_name(), self.hub.protocol_version())
                .encode()
            {
                Ok(envelope) => envelope,
                Err(e) => {
                    let err = TransportError::HandshakeEncoding(e.to_string());
                    let action = self.fire(Event::HandshakeFailed, Some(err));
                    self.perform(action);
                    return;
                }
            };
        let mut request = self.request(HttpMethod::Post);
        request.body = Some(self.outbox.stage(&envelope));

        self.issue(
            request,
            RequestContext::first(RequestKind::Handshake),
            |shared, _, outcome| shared.on_handshake_finished(outcome),
        );
    }

    fn on_handshake_finished(self: &Arc<Self>, outcome: RequestOutcome) {
        let action = match outcome.into_result() {
            Ok(resp) if resp.is_success() => self.fire(Event::HandshakeSucceeded, None),
            Ok(resp) => {
                let err = TransportError::HandshakeRejected {
                    status: resp.status,
                    message: resp.message.clone(),
                    body: resp.text(),
                };
                self.fire(Event::HandshakeFailed, Some(err))
            }
            Err(interruption) => self.fire(
                Event::HandshakeFailed,
                Some(TransportError::HandshakeInterrupted(interruption)),
            ),
        };
        self.perform(action);
    }

    // --- send ----------------------------------------------------------------

    /// Start a send cycle if none is running and frames are waiting.
    ///
    /// Re-checks after releasing the gate so a frame enqueued while the gate
    /// was being released is never stranded.
    fn pump_sends(self: &Arc<Self>) {
        loop {
            if !self.outbox.try_acquire() {
                return;
            }

            if self.state() == TransportState::Connected && !self.outbox.is_empty() {
                let body = self.outbox.take_batch();
                self.post_batch(body, RequestContext::first(RequestKind::Send));
                return;
            }

            self.outbox.release();
            if self.outbox.is_empty() || self.state() != TransportState::Connected {
                return;
            }
        }
    }

    fn post_batch(self: &Arc<Self>, body: Bytes, ctx: RequestContext) {
        debug!(bytes = body.len(), retries = ctx.retries, "sending messages");

        let mut request = self.request(HttpMethod::Post);
        request.body = Some(body.clone());

        self.issue(request, ctx, move |shared, ctx, outcome| {
            shared.on_send_finished(ctx, body, outcome)
        });
    }

    fn on_send_finished(self: &Arc<Self>, ctx: RequestContext, body: Bytes, outcome: RequestOutcome) {
        match outcome.into_result() {
            Ok(resp) if resp.status == STATUS_OK => {
                self.outbox.release();
                self.pump_sends();
            }
            Ok(resp) => {
                self.outbox.release();
                let err = TransportError::SendRejected {
                    status: resp.status,
                    message: resp.message.clone(),
                    body: resp.text(),
                };
                let action = self.fire(Event::SendFailed, Some(err));
                self.perform(action);
            }
            Err(interruption) => {
                if self.state().is_terminal() {
                    self.outbox.release();
                } else if self.retry.should_retry(ctx) {
                    warn!(retries = ctx.retries, error = %interruption, "send interrupted, retrying");
                    self.post_batch(body, ctx.retry());
                } else {
                    self.outbox.release();
                    let err = TransportError::SendRetriesExhausted {
                        retries: ctx.retries,
                        last: interruption,
                    };
                    let action = self.fire(Event::SendFailed, Some(err));
                    self.perform(action);
                }
            }
        }
    }

    // --- poll ----------------------------------------------------------------

    fn poll(self: &Arc<Self>) {
        if self.state() != TransportState::Connected {
            return;
        }

        debug!("sending poll request");

        let mut request = self.request(HttpMethod::Get);
        request.set_header("Accept", self.config.poll_accept.as_str());
        request.timeout = Some(self.config.poll_timeout);

        self.issue(
            request,
            RequestContext::first(RequestKind::Poll),
            |shared, _, outcome| shared.on_poll_finished(outcome),
        );
    }

    fn on_poll_finished(self: &Arc<Self>, outcome: RequestOutcome) {
        let resp = match outcome.into_result() {
            Ok(resp) => resp,
            Err(interruption) => {
                debug!(error = %interruption, "poll interrupted");
                let action = self.fire(Event::PollInterrupted, None);
                self.perform(action);
                return;
            }
        };

        let (event, err) = match resp.status {
            STATUS_OK => (Event::PollData, None),
            STATUS_NO_CONTENT => (Event::PollShutdown, None),
            STATUS_BAD_REQUEST | STATUS_NOT_FOUND => (
                Event::PollRejected,
                Some(TransportError::PollRejected {
                    status: resp.status,
                    body: resp.text(),
                }),
            ),
            status => (
                Event::PollUnexpected,
                Some(TransportError::PollUnexpected {
                    status,
                    message: resp.message.clone(),
                    body: resp.text(),
                }),
            ),
        };

        let action = self.fire(event, err);
        if action == Action::DispatchAndPoll {
            self.dispatch(&resp.body);
        }
        self.perform(action);
    }

    fn dispatch(&self, payload: &[u8]) {
        match self.hub.parse_messages(payload) {
            Ok(messages) if messages.is_empty() => {}
            Ok(messages) => {
                debug!(count = messages.len(), "dispatching messages");
                self.hub.on_messages(messages);
            }
            Err(e) => warn!(error = %e, bytes = payload.len(), "failed to decode poll payload"),
        }
    }

    // --- close ---------------------------------------------------------------

    fn send_close(self: &Arc<Self>, ctx: RequestContext) {
        if self.state() != TransportState::Closing {
            return;
        }

        info!(retries = ctx.retries, "sending DELETE request");

        let request = self.request(HttpMethod::Delete);
        self.issue(request, ctx, |shared, ctx, outcome| {
            shared.on_close_finished(ctx, outcome)
        });
    }

    fn on_close_finished(self: &Arc<Self>, ctx: RequestContext, outcome: RequestOutcome) {
        match outcome.into_result() {
            Ok(resp) if resp.is_success() => {
                let action = self.fire(Event::CloseSettled, None);
                self.perform(action);
                return;
            }
            Ok(resp) => warn!(
                status = resp.status,
                message = %resp.message,
                body = %resp.text(),
                "close request rejected by server"
            ),
            Err(interruption) => warn!(error = %interruption, "close request interrupted"),
        }

        if self.retry.should_retry(ctx) {
            self.send_close(ctx.retry());
        } else {
            warn!(retries = ctx.retries, "close retries exhausted, closing anyway");
            let action = self.fire(Event::CloseSettled, None);
            self.perform(action);
        }
    }
}
