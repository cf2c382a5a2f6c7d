//! Crowdin API error bodies.

use std::fmt;

use serde_json::Value;

/// Error payload returned by Crowdin alongside a non-200 status.
///
/// The parsed body is kept as-is so callers can inspect provider specific
/// fields. Crowdin usually answers with
/// `{"success": false, "error": {"code": 3, "message": "..."}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    status: u16,
    body: Value,
}

impl RemoteError {
    /// Wrap a parsed error body.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// HTTP status the body arrived with.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The parsed error body, untouched.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consume the error and return the parsed body.
    pub fn into_body(self) -> Value {
        self.body
    }

    /// Crowdin error code, if the body has the usual `error.code` field.
    pub fn code(&self) -> Option<i64> {
        let code = self.body.get("error")?.get("code")?;
        // Older endpoints send the code as a string.
        code.as_i64()
            .or_else(|| code.as_str().and_then(|s| s.parse().ok()))
    }

    /// Crowdin error message, if the body has the usual `error.message` field.
    pub fn message(&self) -> Option<&str> {
        self.body.get("error")?.get("message")?.as_str()
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.message()) {
            (Some(code), Some(message)) => write!(f, "API error {}: {}", code, message),
            (Some(code), None) => write!(f, "API error {} (HTTP {})", code, self.status),
            _ => write!(f, "API error (HTTP {}): {}", self.status, self.body),
        }
    }
}
