//! Engine-agnostic HTTP types.
//!
//! The transport never performs I/O itself. It builds an [`HttpRequest`] per
//! cycle, hands it to an [`HttpEngine`] and reacts to the [`RequestOutcome`]
//! delivered to the completion callback.
//!
//! ```text
//! ┌──────────────────────┐   HttpRequest    ┌──────────────┐
//! │  LongPollingTransport│ ───────────────► │  HttpEngine  │ ──► network
//! │                      │ ◄─────────────── │              │
//! └──────────────────────┘  RequestOutcome  └──────────────┘
//!                           (any thread)
//! ```

mod engine;
mod request;
mod retry;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest_engine;

pub use engine::*;
pub use request::*;
pub use retry::*;
