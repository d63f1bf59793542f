//! Protocol constants for the long-polling transport.
//!
//! These values follow the hub transport protocol for long polling.

use std::time::Duration;

// =============================================================================
// RETRIES
// =============================================================================

/// Maximum number of retries for a failed send or close request.
///
/// The poll path is not bounded by this value.
pub const MAX_RETRIES: u32 = 6;

// =============================================================================
// TIMING
// =============================================================================

/// How long a poll request may be held open by the server.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(120);

// =============================================================================
// HANDSHAKE
// =============================================================================

/// Hub protocol version announced in the handshake envelope.
pub const HANDSHAKE_PROTOCOL_VERSION: u32 = 1;

/// Record separator terminating each text-protocol record.
pub const RECORD_SEPARATOR: u8 = 0x1e;

// =============================================================================
// WIRE
// =============================================================================

/// Query parameter carrying the negotiated connection id.
pub const CONNECTION_ID_PARAM: &str = "id";

/// `Accept` value sent with every poll request.
pub const POLL_ACCEPT: &str = "application/octet-stream";

/// Poll succeeded with a payload.
pub const STATUS_OK: u16 = 200;

/// Poll completed because the server shut the connection down.
pub const STATUS_NO_CONTENT: u16 = 204;

/// Request was malformed (missing connection id).
pub const STATUS_BAD_REQUEST: u16 = 400;

/// Connection is unknown to the server.
pub const STATUS_NOT_FOUND: u16 = 404;
