//! Handshake envelope.
//!
//! The first request of every connection announces the hub protocol:
//!
//! ```text
//! {"protocol":"json","version":1}\x1e
//! ```

use serde::{Deserialize, Serialize};

use super::framing::with_separator;

/// Handshake request sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRequest {
    /// Hub protocol name.
    pub protocol: String,
    /// Hub protocol version.
    pub version: u32,
}

impl HandshakeRequest {
    /// Create a handshake request.
    pub fn new(protocol: impl Into<String>, version: u32) -> Self {
        Self {
            protocol: protocol.into(),
            version,
        }
    }

    /// Encode as a separator-terminated JSON record.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(with_separator(&json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode_json_records;

    #[test]
    fn test_encode_envelope() {
        let encoded = HandshakeRequest::new("json", 1).encode().unwrap();
        assert_eq!(encoded, b"{\"protocol\":\"json\",\"version\":1}\x1e".to_vec());
    }

    #[test]
    fn test_envelope_decodes_back() {
        let encoded = HandshakeRequest::new("messagepack", 1).encode().unwrap();
        let decoded: Vec<HandshakeRequest> = decode_json_records(&encoded).unwrap();
        assert_eq!(decoded, vec![HandshakeRequest::new("messagepack", 1)]);
    }

    #[test]
    fn test_encode_escapes_protocol_name() {
        let encoded = HandshakeRequest::new("a\"b", 2).encode().unwrap();
        assert_eq!(encoded, b"{\"protocol\":\"a\\\"b\",\"version\":2}\x1e".to_vec());
    }
}
