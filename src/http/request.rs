//! Request, response and outcome types.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::core::Interruption;

/// HTTP methods used by the long-polling protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Poll for server-to-client messages.
    Get,
    /// Handshake and client-to-server messages.
    Post,
    /// Graceful shutdown.
    Delete,
}

impl HttpMethod {
    /// Method name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single HTTP request issued by the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Target URI, including the connection id query parameter.
    pub uri: Url,
    /// Request headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Per-request timeout; `None` leaves the engine default.
    pub timeout: Option<Duration>,
    /// Upload body.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a request with no headers, timeout or body.
    pub fn new(method: HttpMethod, uri: Url) -> Self {
        Self {
            method,
            uri,
            headers: Vec::new(),
            timeout: None,
            body: None,
        }
    }

    /// Set a header, replacing any existing value (names compare case-insensitively).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Look up a header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A finished HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase.
    pub message: String,
    /// Response headers (lowercase names).
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a response with the given status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            message: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Look up a response header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Terminal state of a request, as reported by the engine.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    /// The server answered; any status code.
    Finished(HttpResponse),
    /// The request failed with an error.
    Error(String),
    /// The request was aborted.
    Aborted,
    /// Connecting to the server timed out.
    ConnectionTimedOut,
    /// The request did not finish in the given time.
    TimedOut,
}

impl RequestOutcome {
    /// Split into the response or the reason there is none.
    pub fn into_result(self) -> Result<HttpResponse, Interruption> {
        match self {
            RequestOutcome::Finished(response) => Ok(response),
            RequestOutcome::Error(reason) => Err(Interruption::Error(reason)),
            RequestOutcome::Aborted => Err(Interruption::Aborted),
            RequestOutcome::ConnectionTimedOut => Err(Interruption::ConnectionTimedOut),
            RequestOutcome::TimedOut => Err(Interruption::TimedOut),
        }
    }
}

impl From<HttpResponse> for RequestOutcome {
    fn from(response: HttpResponse) -> Self {
        RequestOutcome::Finished(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        HttpRequest::new(HttpMethod::Post, Url::parse("http://localhost/hub").unwrap())
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut req = request();
        req.set_header("Accept", "text/plain");
        req.set_header("accept", "application/octet-stream");

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("ACCEPT"), Some("application/octet-stream"));
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn test_response_text_is_lossy() {
        let response = HttpResponse::new(200, vec![b'o', b'k', 0xff]);
        assert_eq!(response.text(), "ok\u{fffd}");
    }

    #[test]
    fn test_outcome_into_result() {
        assert!(RequestOutcome::from(HttpResponse::new(404, "")).into_result().is_ok());
        assert_eq!(
            RequestOutcome::TimedOut.into_result().unwrap_err(),
            Interruption::TimedOut
        );
        assert_eq!(
            RequestOutcome::Error("refused".into()).into_result().unwrap_err(),
            Interruption::Error("refused".into())
        );
    }

    #[test]
    fn test_method_names() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }
}
