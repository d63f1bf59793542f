//! Hub protocol helpers.
//!
//! - **Framing**: record-separated text records ([`with_separator`], [`split_records`])
//! - **Handshake**: the envelope announcing the hub protocol ([`HandshakeRequest`])
//! - **JSON records**: decoding helper for JSON hub protocols ([`decode_json_records`])

mod framing;
mod handshake;

pub use framing::*;
pub use handshake::*;
