//! # HTTP Utilities
//!
//! Helpers for turning GitHub REST error responses into messages a person can act on.

use serde_json::Value;

/// Return a user-friendly error message for common HTTP status codes.
///
/// # Example
/// ```rust
/// use ghwf_util::http::status_error_message;
///
/// let error_401 = status_error_message(401).unwrap();
/// assert!(error_401.contains("GH_TOKEN"));
/// assert!(error_401.contains("Unauthorized"));
///
/// let error_403 = status_error_message(403).unwrap();
/// assert!(error_403.contains("Forbidden"));
///
/// assert!(status_error_message(500).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: set GH_TOKEN=... or add the host to ~/.netrc".into()),
        403 => Some("Forbidden (403). Hint: the token needs the `actions:write` (or `repo`) scope for this repository".into()),
        404 => Some("Not Found (404). Hint: check the repository name and that the token can see it".into()),
        422 => Some("Unprocessable Entity (422). Hint: check the ref and the workflow inputs".into()),
        _ => None,
    }
}

/// Extract the `message` field GitHub includes in JSON error bodies.
///
/// Falls back to a whitespace-collapsed preview of the body when it is not JSON
/// or carries no message.
///
/// # Example
/// ```rust
/// use ghwf_util::http::api_error_message;
///
/// assert_eq!(api_error_message(r#"{"message":"Not Found"}"#), "Not Found");
/// assert_eq!(api_error_message(""), "<empty>");
/// ```
pub fn api_error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body)
        && let Some(Value::String(message)) = map.get("message")
    {
        return message.clone();
    }
    truncate_response_preview(body, 200)
}

/// Collapse line breaks and tabs and cut the text at roughly `limit` bytes.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_preview_for_plain_text() {
        assert_eq!(api_error_message("bad\ngateway"), "bad gateway");
    }

    #[test]
    fn json_without_message_uses_preview() {
        assert_eq!(api_error_message(r#"{"error":"x"}"#), r#"{"error":"x"}"#);
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "a".repeat(500);
        let preview = truncate_response_preview(&body, 10);
        assert_eq!(preview, "aaaaaaaaaa...");
    }
}
