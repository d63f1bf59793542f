//! Long-polling transport.
//!
//! This module implements the client side of the long-polling transport:
//!
//! - **Lifecycle**: [`TransportState`] and the [`transition`] table
//! - **Outgoing path**: [`Outbox`], a FIFO drained by a single-flight send gate
//! - **Transport**: [`LongPollingTransport`], the handshake/send/poll/close cycles
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Hub Connection               │
//! ├─────────────────────────────────────────┤
//! │       Long-Polling Transport            │  ← This module
//! │   state machine, outbox, poll loop      │
//! ├─────────────────────────────────────────┤
//! │            HTTP Engine                  │
//! └─────────────────────────────────────────┘
//! ```

mod long_polling;
mod outbox;
mod state;

pub use long_polling::*;
pub use outbox::*;
pub use state::*;
