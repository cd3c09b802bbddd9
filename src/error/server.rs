use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured error information extracted from a search-cluster error body.
///
/// The cluster answers failed requests with either
/// `{"error": {"type": ..., "reason": ...}, "status": N}` or, on older
/// versions, `{"error": "text", "status": N}`. Anything else is kept as a
/// truncated raw message.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerErrorInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<u16>,
}

const MAX_RAW_BODY: usize = 200;

impl ServerErrorInfo {
    /// Parse an error body returned with a non-success status.
    pub fn from_body(status: u16, body: &str) -> Self {
        let mut info = ServerErrorInfo {
            status: Some(status),
            ..Default::default()
        };

        let parsed: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) => {
                info.reason = raw_reason(body);
                return info;
            }
        };

        if let Some(code) = parsed.get("status").and_then(Value::as_u64) {
            info.status = u16::try_from(code).ok().or(info.status);
        }

        match parsed.get("error") {
            Some(Value::Object(error)) => {
                info.error_type = error.get("type").and_then(Value::as_str).map(str::to_owned);
                info.reason = error
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                info.index = error.get("index").and_then(Value::as_str).map(str::to_owned);
            }
            Some(Value::String(text)) => info.reason = Some(text.clone()),
            _ => info.reason = raw_reason(body),
        }

        info
    }

    /// Short human readable reason, if any was found.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Convert error info to pretty-printed JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn raw_reason(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_RAW_BODY).collect())
    }
}

/// Format server error info as pretty JSON wrapped in an `error` field.
///
/// Used by `TransportError::Server`'s `Display` implementation.
pub fn format_server_error(f: &mut fmt::Formatter<'_>, info: &ServerErrorInfo) -> fmt::Result {
    let wrapper = serde_json::json!({ "error": info });
    let json_output = serde_json::to_string_pretty(&wrapper).map_err(|_| fmt::Error)?;
    write!(f, "\n{json_output}")
}
