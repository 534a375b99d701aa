use std::env;

/// Reads `key`, treating unset, blank, and whitespace-only values alike.
pub fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
