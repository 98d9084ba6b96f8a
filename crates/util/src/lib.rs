pub mod config;
pub mod http;
pub mod path_processing;

pub use config::*;
pub use path_processing::*;

use once_cell::sync::Lazy;
use regex::Regex;

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([\w\-\.=:/+ ]+)",
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
        r"(gh[pousr]_)[A-Za-z0-9_]{20,}",
        r"(github_pat_)[A-Za-z0-9_]{20,}",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for re in SENSITIVE_PATTERNS.iter() {
        redacted = re
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}
