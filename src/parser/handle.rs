//! Detection of target-network handles (`@name@domain`) in free-form profile text.

use regex::Regex;
use std::sync::OnceLock;

/// Name part is word characters; the domain starts and ends on an alphanumeric
/// and may contain dots, hyphens and underscores in between.
const HANDLE_PATTERN: &str = r"@\w+@[a-zA-Z0-9]+[a-zA-Z0-9._-]*[a-zA-Z0-9]+";

fn handle_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(HANDLE_PATTERN).expect("Invalid regex pattern defined in code"))
}

/// Returns the first handle found in `text`, verbatim, leading `@` included.
#[must_use]
pub fn extract_handle(text: &str) -> Option<&str> {
    handle_regex().find(text).map(|m| m.as_str())
}
