//! Response and transport-failure classification.
//!
//! # Responsibilities
//! - Decide between pass-through JSON and a synthesized error payload
//! - Label error statuses with operator-actionable messages
//! - Turn transport failures into a kind plus a message naming the endpoint
//!
//! # Design Decisions
//! - Classification is total: every input yields an envelope-ready result
//! - Transport failures are classified by structured kind first (timeout,
//!   io error kind in the source chain) and by message text only as a
//!   fallback
//! - Non-JSON bodies are kept only as a bounded preview

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde_json::{json, Map, Value};

pub const AUTH_FAILED: &str = "Authentication failed — check your API key";
pub const ENDPOINT_NOT_FOUND: &str = "API endpoint not found - check your custom URL";
pub const NON_JSON_SUCCESS: &str =
    "Server returned non-JSON response - this may not be the correct API endpoint";

/// Snapshot of what the gateway returned.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub status_text: String,
    /// Header names are lowercase; repeated headers are joined with ", ".
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RawResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// Outcome of classifying a gateway response.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    /// Status the envelope is sent with.
    pub status: StatusCode,
    /// Fields flattened into the envelope.
    pub payload: Map<String, Value>,
    /// Body as recorded in the debug trace (parsed JSON or raw preview).
    pub trace_body: Value,
    /// Synthesized error label, when the proxy produced one.
    pub error: Option<String>,
}

/// Classify a gateway response.
pub fn classify_response(raw: &RawResponse, preview_limit: usize) -> Classified {
    let status = envelope_status(raw.status);

    if is_json(raw.content_type()) {
        if let Ok(parsed) = serde_json::from_str::<Value>(&raw.body) {
            return classify_json(raw, status, parsed);
        }
        tracing::debug!(status = %raw.status, "JSON content type with unparseable body");
    }

    if raw.status.is_success() && raw.body.trim().is_empty() {
        return Classified {
            status,
            payload: Map::new(),
            trace_body: Value::String(String::new()),
            error: None,
        };
    }

    let label = non_json_label(raw);
    let preview = preview(&raw.body, preview_limit);

    let mut payload = Map::new();
    payload.insert("xResult".into(), json!("E"));
    payload.insert("xError".into(), json!(label));
    if !preview.is_empty() {
        payload.insert("rawResponse".into(), json!(preview));
    }

    Classified {
        status,
        payload,
        trace_body: Value::String(preview),
        error: Some(label),
    }
}

fn classify_json(raw: &RawResponse, status: StatusCode, parsed: Value) -> Classified {
    let mut payload = match parsed.clone() {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".into(), other);
            map
        }
    };

    let mut error = None;
    let is_error_status = raw.status.is_client_error() || raw.status.is_server_error();
    if is_error_status && !payload.contains_key("xError") && !payload.contains_key("error") {
        let label = match raw.status.as_u16() {
            401 | 403 => AUTH_FAILED.to_string(),
            code => format!("HTTP {}: {}", code, raw.status_text),
        };
        payload.insert("xError".into(), json!(label));
        payload.entry("xResult").or_insert_with(|| json!("E"));
        error = Some(label);
    }

    Classified {
        status,
        payload,
        trace_body: parsed,
        error,
    }
}

fn non_json_label(raw: &RawResponse) -> String {
    match raw.status.as_u16() {
        401 | 403 => AUTH_FAILED.to_string(),
        404 => ENDPOINT_NOT_FOUND.to_string(),
        _ if raw.status.is_success() => NON_JSON_SUCCESS.to_string(),
        code => format!("Server error: HTTP {} {}", code, raw.status_text),
    }
}

/// 2xx collapses to 200; anything else is mirrored.
fn envelope_status(upstream: StatusCode) -> StatusCode {
    if upstream.is_success() {
        StatusCode::OK
    } else {
        upstream
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.contains("application/json") || ct.contains("+json")
        })
        .unwrap_or(false)
}

/// Truncate to `limit` characters, marking the cut.
pub fn preview(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Why a call never produced an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailureKind {
    NameResolution,
    ConnectionRefused,
    Tls,
    Timeout,
    InvalidRequest,
    Other,
}

impl TransportFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportFailureKind::NameResolution => "name_resolution",
            TransportFailureKind::ConnectionRefused => "connection_refused",
            TransportFailureKind::Tls => "tls",
            TransportFailureKind::Timeout => "timeout",
            TransportFailureKind::InvalidRequest => "invalid_request",
            TransportFailureKind::Other => "other",
        }
    }
}

/// Classified transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: TransportFailureKind,
    /// Operator-facing message; always names the endpoint.
    pub message: String,
    /// Full error text, source chain included.
    pub detail: String,
}

impl TransportFailure {
    pub fn new(kind: TransportFailureKind, endpoint: &str, detail: String) -> Self {
        let message = match kind {
            TransportFailureKind::NameResolution => format!(
                "Could not resolve host for {} - check the URL and your network connection",
                endpoint
            ),
            TransportFailureKind::ConnectionRefused => {
                format!("Connection refused by {} - is the server running?", endpoint)
            }
            TransportFailureKind::Tls => format!(
                "SSL/TLS error connecting to {} - check the server certificate",
                endpoint
            ),
            TransportFailureKind::Timeout => format!("Request to {} timed out", endpoint),
            TransportFailureKind::InvalidRequest => {
                format!("Could not build a request for {}: {}", endpoint, detail)
            }
            TransportFailureKind::Other => format!("Failed to connect to {}: {}", endpoint, detail),
        };
        Self { kind, message, detail }
    }
}

/// Classify any error by walking its source chain.
pub fn classify_transport_error(
    err: &(dyn std::error::Error + 'static),
    endpoint: &str,
) -> TransportFailure {
    let detail = error_chain_text(err);
    let kind = structured_kind(err)
        .unwrap_or_else(|| kind_from_text(&without_endpoint(&detail, endpoint)));
    TransportFailure::new(kind, endpoint, detail)
}

/// Classify a `reqwest` failure, using its own flags before the chain.
///
/// Only connect-phase failures are matched by text, and only against the
/// causes below reqwest's own message, which embeds the URL.
pub fn classify_reqwest_error(err: &reqwest::Error, endpoint: &str) -> TransportFailure {
    let detail = error_chain_text(err);
    let kind = if err.is_timeout() {
        TransportFailureKind::Timeout
    } else if err.is_builder() {
        TransportFailureKind::InvalidRequest
    } else if let Some(kind) = structured_kind(err) {
        kind
    } else if err.is_connect() {
        kind_from_text(&cause_text(err, endpoint))
    } else {
        TransportFailureKind::Other
    };
    TransportFailure::new(kind, endpoint, detail)
}

fn cause_text(err: &(dyn std::error::Error + 'static), endpoint: &str) -> String {
    let text = match err.source() {
        Some(source) => error_chain_text(source),
        None => err.to_string(),
    };
    without_endpoint(&text, endpoint)
}

fn without_endpoint(text: &str, endpoint: &str) -> String {
    if endpoint.is_empty() {
        text.to_string()
    } else {
        text.replace(endpoint, "")
    }
}

fn structured_kind(err: &(dyn std::error::Error + 'static)) -> Option<TransportFailureKind> {
    std::iter::successors(Some(err), |e| e.source()).find_map(|e| {
        let io = e.downcast_ref::<std::io::Error>()?;
        match io.kind() {
            std::io::ErrorKind::ConnectionRefused => Some(TransportFailureKind::ConnectionRefused),
            std::io::ErrorKind::TimedOut => Some(TransportFailureKind::Timeout),
            _ => None,
        }
    })
}

fn kind_from_text(detail: &str) -> TransportFailureKind {
    const NAME_RESOLUTION: &[&str] = &[
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "nodename nor servname",
        "no such host",
        "name resolution",
        "enotfound",
    ];
    const REFUSED: &[&str] = &["connection refused", "econnrefused", "actively refused"];
    const TLS: &[&str] = &["certificate", "tls", "ssl", "handshake"];

    let lower = detail.to_ascii_lowercase();
    let any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if any(NAME_RESOLUTION) {
        TransportFailureKind::NameResolution
    } else if any(REFUSED) {
        TransportFailureKind::ConnectionRefused
    } else if any(TLS) {
        TransportFailureKind::Tls
    } else if lower.contains("timed out") {
        TransportFailureKind::Timeout
    } else {
        TransportFailureKind::Other
    }
}

fn error_chain_text(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    for e in std::iter::successors(Some(err), |e| e.source()) {
        let text = e.to_string();
        // Wrappers often repeat their source's text verbatim.
        if !parts.last().map(|p| p.contains(&text)).unwrap_or(false) {
            parts.push(text);
        }
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, content_type: Option<&str>, body: &str) -> RawResponse {
        let status = StatusCode::from_u16(status).unwrap();
        let mut headers = BTreeMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type".to_string(), ct.to_string());
        }
        RawResponse {
            status,
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body: body.to_string(),
        }
    }

    #[derive(Debug)]
    struct Wrapped {
        msg: &'static str,
        source: Option<std::io::Error>,
    }

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.msg)
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source
                .as_ref()
                .map(|e| e as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_json_success_passes_through() {
        let c = classify_response(
            &raw(200, Some("application/json; charset=utf-8"), r#"{"xResult":"S","xDeviceId":"d1"}"#),
            500,
        );
        assert_eq!(c.status, StatusCode::OK);
        assert_eq!(c.payload["xDeviceId"], "d1");
        assert!(c.error.is_none());
        assert_eq!(c.trace_body["xResult"], "S");
    }

    #[test]
    fn test_json_created_collapses_to_ok() {
        let c = classify_response(&raw(201, Some("application/json"), "{}"), 500);
        assert_eq!(c.status, StatusCode::OK);
    }

    #[test]
    fn test_json_error_without_message_gets_label() {
        let c = classify_response(&raw(401, Some("application/json"), "{}"), 500);
        assert_eq!(c.status, StatusCode::UNAUTHORIZED);
        assert_eq!(c.payload["xError"], AUTH_FAILED);
        assert_eq!(c.payload["xResult"], "E");

        let c = classify_response(&raw(422, Some("application/json"), r#"{"xRefnum":"1"}"#), 500);
        assert_eq!(c.payload["xError"], "HTTP 422: Unprocessable Entity");
        assert_eq!(c.payload["xRefnum"], "1");
    }

    #[test]
    fn test_json_error_keeps_gateway_message() {
        let c = classify_response(
            &raw(400, Some("application/json"), r#"{"xResult":"E","xError":"Invalid device"}"#),
            500,
        );
        assert_eq!(c.status, StatusCode::BAD_REQUEST);
        assert_eq!(c.payload["xError"], "Invalid device");
        assert!(c.error.is_none());
    }

    #[test]
    fn test_json_array_wrapped_in_data() {
        let c = classify_response(&raw(200, Some("application/json"), "[1,2]"), 500);
        assert_eq!(c.payload["data"], json!([1, 2]));
    }

    #[test]
    fn test_non_json_not_found() {
        let c = classify_response(&raw(404, Some("text/html"), "<html>Not Found</html>"), 500);
        assert_eq!(c.status, StatusCode::NOT_FOUND);
        assert_eq!(c.payload["xError"], ENDPOINT_NOT_FOUND);
        assert_eq!(c.payload["xResult"], "E");
        assert_eq!(c.payload["rawResponse"], "<html>Not Found</html>");
        assert_eq!(c.trace_body, json!("<html>Not Found</html>"));
    }

    #[test]
    fn test_non_json_labels() {
        assert_eq!(classify_response(&raw(403, None, "nope"), 500).payload["xError"], AUTH_FAILED);
        assert_eq!(
            classify_response(&raw(200, Some("text/html"), "<html/>"), 500).payload["xError"],
            NON_JSON_SUCCESS
        );
        assert_eq!(
            classify_response(&raw(502, Some("text/plain"), "bad"), 500).payload["xError"],
            "Server error: HTTP 502 Bad Gateway"
        );
    }

    #[test]
    fn test_malformed_json_treated_as_text() {
        let c = classify_response(&raw(200, Some("application/json"), "<html>"), 500);
        assert_eq!(c.payload["xError"], NON_JSON_SUCCESS);
    }

    #[test]
    fn test_empty_success_is_not_an_error() {
        let c = classify_response(&raw(204, None, ""), 500);
        assert_eq!(c.status, StatusCode::OK);
        assert!(c.payload.is_empty());
        assert!(c.error.is_none());
    }

    #[test]
    fn test_preview_is_bounded() {
        let body = "x".repeat(1200);
        let c = classify_response(&raw(500, Some("text/html"), &body), 500);
        let preview = c.payload["rawResponse"].as_str().unwrap();
        assert_eq!(preview.len(), 503);
        assert!(preview.ends_with("..."));
        assert_eq!(super::preview("héllo", 10), "héllo");
        assert_eq!(super::preview("héllo", 2), "hé...");
    }

    #[test]
    fn test_transport_refused_by_io_kind() {
        let err = Wrapped {
            msg: "client error (Connect)",
            source: Some(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "os error 111")),
        };
        let failure = classify_transport_error(&err, "http://127.0.0.1:1/v1/Device");
        assert_eq!(failure.kind, TransportFailureKind::ConnectionRefused);
        assert!(failure.message.contains("http://127.0.0.1:1/v1/Device"));
        assert_eq!(failure.detail, "client error (Connect): os error 111");
    }

    #[test]
    fn test_transport_dns_by_text() {
        let err = Wrapped {
            msg: "error sending request",
            source: Some(std::io::Error::new(
                std::io::ErrorKind::Other,
                "dns error: failed to lookup address information: Name or service not known",
            )),
        };
        let endpoint = "https://nowhere.invalid/v1/Device";
        let failure = classify_transport_error(&err, endpoint);
        assert_eq!(failure.kind, TransportFailureKind::NameResolution);
        assert!(failure.message.contains(endpoint));
    }

    #[test]
    fn test_transport_url_text_does_not_pick_kind() {
        let endpoint = "http://127.0.0.1:9/tls-gw/v1/Device";
        let err = Wrapped {
            msg: "error sending request for url (http://127.0.0.1:9/tls-gw/v1/Device)",
            source: Some(std::io::Error::new(
                std::io::ErrorKind::Other,
                "connection closed before message completed",
            )),
        };
        let failure = classify_transport_error(&err, endpoint);
        assert_eq!(failure.kind, TransportFailureKind::Other);
        assert!(failure.message.starts_with("Failed to connect to http://127.0.0.1:9/tls-gw"));
    }

    #[test]
    fn test_transport_tls_and_fallback() {
        let err = Wrapped {
            msg: "invalid peer certificate: UnknownIssuer",
            source: None,
        };
        assert_eq!(classify_transport_error(&err, "e").kind, TransportFailureKind::Tls);

        let err = Wrapped {
            msg: "something odd happened",
            source: None,
        };
        let failure = classify_transport_error(&err, "https://gw.example.com/v1/Device");
        assert_eq!(failure.kind, TransportFailureKind::Other);
        assert_eq!(
            failure.message,
            "Failed to connect to https://gw.example.com/v1/Device: something odd happened"
        );
    }
}
