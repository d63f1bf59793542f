//! Per-cycle request context and retry bookkeeping.
//!
//! Every request carries a [`RequestContext`] into its completion callback so
//! that retry counting never depends on state stashed on the request itself.

use std::fmt;

use crate::core::constants::MAX_RETRIES;

/// Which cycle a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Initial protocol handshake (POST).
    Handshake,
    /// Client-to-server message batch (POST).
    Send,
    /// Long poll for server-to-client messages (GET).
    Poll,
    /// Graceful shutdown (DELETE).
    Close,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestKind::Handshake => "handshake",
            RequestKind::Send => "send",
            RequestKind::Poll => "poll",
            RequestKind::Close => "close",
        })
    }
}

/// Context travelling with one request of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Cycle kind.
    pub kind: RequestKind,
    /// Retries already issued for this cycle (0 for the first attempt).
    pub retries: u32,
}

impl RequestContext {
    /// Context for the first attempt of a cycle.
    pub fn first(kind: RequestKind) -> Self {
        Self { kind, retries: 0 }
    }

    /// Context for the next attempt of the same cycle.
    pub fn retry(self) -> Self {
        Self {
            kind: self.kind,
            retries: self.retries.saturating_add(1),
        }
    }
}

/// Bounded retry budget shared by the send and close paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES)
    }
}

impl RetryPolicy {
    /// Create a policy allowing `max_retries` retries per cycle.
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Maximum retries per cycle.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Check if a failed attempt described by `ctx` may be retried.
    pub fn should_retry(&self, ctx: RequestContext) -> bool {
        ctx.retries < self.max_retries
    }
}
