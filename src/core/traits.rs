//! Collaborator traits for the long-polling transport.
//!
//! The transport sits between a hub connection (which owns message encoding
//! and dispatch) and an HTTP engine (which performs the actual network I/O).

use url::Url;

use super::error::DecodeError;
use crate::http::HttpRequest;
use crate::transport::TransportState;

/// Hook that adorns every outgoing request with credentials.
pub trait AuthenticationProvider: Send + Sync {
    /// Add authentication data (headers, query parameters) to `request`.
    fn prepare_request(&self, request: &mut HttpRequest);
}

/// Bearer-token authentication.
#[derive(Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    /// Create a provider sending `Authorization: Bearer <token>`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl AuthenticationProvider for BearerToken {
    fn prepare_request(&self, request: &mut HttpRequest) {
        request.set_header("Authorization", format!("Bearer {}", self.token));
    }
}

/// The connection that owns a transport.
///
/// It is the sole source of outbound frames and the sole consumer of
/// decoded inbound messages.
///
/// # Example
///
/// ```ignore
/// struct Chat { uri: Url }
///
/// impl HubConnection for Chat {
///     type Message = serde_json::Value;
///
///     fn uri(&self) -> &Url { &self.uri }
///     fn protocol_name(&self) -> &str { "json" }
///
///     fn parse_messages(&self, payload: &[u8]) -> Result<Vec<Self::Message>, DecodeError> {
///         decode_json_records(payload)
///     }
///
///     fn on_messages(&self, messages: Vec<Self::Message>) {
///         for message in messages {
///             println!("{message}");
///         }
///     }
/// }
/// ```
pub trait HubConnection: Send + Sync + 'static {
    /// Decoded hub message.
    type Message: Send;

    /// Base endpoint of the hub.
    fn uri(&self) -> &Url;

    /// Connection id obtained during negotiation, if any.
    ///
    /// When present it is sent as the `id` query parameter on every request.
    fn connection_id(&self) -> Option<&str> {
        None
    }

    /// Name of the hub protocol announced in the handshake (e.g. `"json"`).
    fn protocol_name(&self) -> &str;

    /// Version of the hub protocol announced in the handshake.
    fn protocol_version(&self) -> u32 {
        crate::core::constants::HANDSHAKE_PROTOCOL_VERSION
    }

    /// Authentication hook invoked before every request.
    fn authentication(&self) -> Option<&dyn AuthenticationProvider> {
        None
    }

    /// Decode a poll payload into zero or more messages.
    fn parse_messages(&self, payload: &[u8]) -> Result<Vec<Self::Message>, DecodeError>;

    /// Receive messages decoded from one poll response, in server order.
    fn on_messages(&self, messages: Vec<Self::Message>);

    /// Observe a transport state transition.
    fn on_state_changed(&self, old: TransportState, new: TransportState) {
        let _ = (old, new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    #[test]
    fn test_bearer_token_sets_header() {
        let mut request = HttpRequest::new(
            HttpMethod::Get,
            Url::parse("http://localhost/hub").unwrap(),
        );
        BearerToken::new("s3cret").prepare_request(&mut request);
        assert_eq!(request.header("authorization"), Some("Bearer s3cret"));
    }

    #[test]
    fn test_bearer_token_debug_redacts() {
        let debug = format!("{:?}", BearerToken::new("s3cret"));
        assert!(!debug.contains("s3cret"));
    }
}
