//! Error types for the long-polling transport.

use thiserror::Error;

/// Errors that can occur when decoding a poll payload into hub messages.
#[derive(Debug, Error, Clone)]
pub enum DecodeError {
    /// Invalid encoding.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Unexpected end of data.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// Message type unknown to the protocol.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),
}

/// Why a request did not produce an HTTP response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Interruption {
    /// The engine reported an error.
    #[error("request error: {0}")]
    Error(String),

    /// The request was aborted.
    #[error("request aborted")]
    Aborted,

    /// Connecting to the server timed out.
    #[error("connection timed out")]
    ConnectionTimedOut,

    /// The request did not finish in the given time.
    #[error("processing the request timed out")]
    TimedOut,
}

/// Reasons a transport moved into the failed state.
///
/// The `Display` form of this error is the transport's error reason.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Handshake completed but the server answered with a non-success status.
    #[error("handshake rejected by server: status {status}-{message} body: {body}")]
    HandshakeRejected {
        /// HTTP status code.
        status: u16,
        /// HTTP reason phrase.
        message: String,
        /// Response body as text.
        body: String,
    },

    /// Handshake request never produced a response.
    #[error("handshake failed: {0}")]
    HandshakeInterrupted(Interruption),

    /// Handshake envelope could not be serialized.
    #[error("handshake encoding failed: {0}")]
    HandshakeEncoding(String),

    /// Send request answered with a status other than 200.
    #[error("send rejected by server: status {status}-{message} body: {body}")]
    SendRejected {
        /// HTTP status code.
        status: u16,
        /// HTTP reason phrase.
        message: String,
        /// Response body as text.
        body: String,
    },

    /// Send request kept failing until the retry budget ran out.
    #[error("send reached max retry count ({retries}): {last}")]
    SendRetriesExhausted {
        /// Retries issued before giving up.
        retries: u32,
        /// The interruption of the final attempt.
        last: Interruption,
    },

    /// Poll answered 400/404: the server does not know this connection.
    #[error("poll rejected by server: status {status} body: {body}")]
    PollRejected {
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },

    /// Poll answered with a status the protocol does not define.
    #[error("poll failed: status {status}-{message} body: {body}")]
    PollUnexpected {
        /// HTTP status code.
        status: u16,
        /// HTTP reason phrase.
        message: String,
        /// Response body as text.
        body: String,
    },
}

impl TransportError {
    /// HTTP status carried by this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::HandshakeRejected { status, .. }
            | TransportError::SendRejected { status, .. }
            | TransportError::PollRejected { status, .. }
            | TransportError::PollUnexpected { status, .. } => Some(*status),
            TransportError::HandshakeInterrupted(_)
            | TransportError::HandshakeEncoding(_)
            | TransportError::SendRetriesExhausted { .. } => None,
        }
    }

    /// Check if this error happened before the connection was established.
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            TransportError::HandshakeRejected { .. }
                | TransportError::HandshakeInterrupted(_)
                | TransportError::HandshakeEncoding(_)
        )
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Poll timeout must be non-zero.
    #[error("poll timeout must be greater than zero")]
    ZeroPollTimeout,

    /// Header name or value is unusable.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_reason_carries_status_and_body() {
        let err = TransportError::HandshakeRejected {
            status: 500,
            message: "Internal Server Error".into(),
            body: "hub exploded".into(),
        };
        let reason = err.to_string();
        assert!(reason.contains("500"));
        assert!(reason.contains("hub exploded"));
        assert!(err.is_handshake());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_interruptions_have_no_status() {
        let err = TransportError::SendRetriesExhausted {
            retries: 6,
            last: Interruption::TimedOut,
        };
        assert_eq!(err.status(), None);
        assert!(!err.is_handshake());
        assert!(err.to_string().contains("(6)"));

        let err = TransportError::HandshakeInterrupted(Interruption::Aborted);
        assert!(err.is_handshake());
        assert_eq!(err.status(), None);

        let err = TransportError::HandshakeEncoding("key must be a string".into());
        assert!(err.is_handshake());
        assert_eq!(err.status(), None);
    }
}
