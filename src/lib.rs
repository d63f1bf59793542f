//! # longpoll-transport
//!
//! A long-polling HTTP transport for hub-style real-time connections.
//!
//! The transport emulates a persistent bidirectional stream with sequential
//! HTTP request/response cycles:
//!
//! - **Handshake**: `POST` announcing the hub protocol
//! - **Send**: `POST` carrying every queued frame, at most one in flight
//! - **Poll**: `GET` held open by the server and re-issued after every response
//! - **Close**: `DELETE`, racing the outstanding poll
//!
//! The transport performs no I/O itself. A [`HubConnection`] supplies the
//! endpoint and decodes/dispatches messages; an [`HttpEngine`] performs the
//! requests and reports their outcome through a completion callback.
//!
//! ## Feature Flags
//!
//! - `reqwest` (default): [`http::reqwest_engine::ReqwestEngine`], an engine on reqwest + tokio
//!
//! ## Modules
//!
//! - [`core`]: constants, error types and collaborator traits
//! - [`http`]: engine-agnostic request/response types and the engine trait
//! - [`protocol`]: record framing and the handshake envelope
//! - [`transport`]: state machine, outbox and the transport itself
//! - [`config`]: transport configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use longpoll_transport::prelude::*;
//! use url::Url;
//!
//! struct Chat {
//!     uri: Url,
//! }
//!
//! impl HubConnection for Chat {
//!     type Message = serde_json::Value;
//!
//!     fn uri(&self) -> &Url {
//!         &self.uri
//!     }
//!
//!     fn protocol_name(&self) -> &str {
//!         "json"
//!     }
//!
//!     fn parse_messages(&self, payload: &[u8]) -> Result<Vec<Self::Message>, DecodeError> {
//!         decode_json_records(payload)
//!     }
//!
//!     fn on_messages(&self, messages: Vec<Self::Message>) {
//!         for message in messages {
//!             println!("{message}");
//!         }
//!     }
//! }
//!
//! struct Offline;
//!
//! impl HttpEngine for Offline {
//!     fn send(&self, _request: HttpRequest, on_complete: Completion) {
//!         on_complete(RequestOutcome::ConnectionTimedOut);
//!     }
//! }
//!
//! let hub = Arc::new(Chat {
//!     uri: Url::parse("http://localhost:3000/chat").unwrap(),
//! });
//! let transport = LongPollingTransport::new(hub, Offline, TransportConfig::default());
//!
//! transport.start_connect();
//! assert_eq!(transport.state(), TransportState::Failed);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod core;
pub mod http;
pub mod protocol;
pub mod transport;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{TransportConfig, TransportConfigBuilder};
    pub use crate::core::*;
    pub use crate::http::{
        Completion, HttpEngine, HttpMethod, HttpRequest, HttpResponse, RequestContext,
        RequestKind, RequestOutcome, RetryPolicy,
    };
    pub use crate::protocol::{HandshakeRequest, decode_json_records, split_records};
    pub use crate::transport::{LongPollingTransport, TransportState};

    #[cfg(feature = "reqwest")]
    pub use crate::http::reqwest_engine::ReqwestEngine;
}

// Re-export commonly used items at crate root
pub use crate::config::TransportConfig;
pub use crate::core::{DecodeError, HubConnection, TransportError};
pub use crate::http::{HttpEngine, RequestOutcome};
pub use crate::transport::{LongPollingTransport, TransportState};
