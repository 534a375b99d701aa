use std::env;

/// Environment variables consulted for a hub token, highest priority first.
pub const TOKEN_ENV_VARS: &[&str] = &["HUGGINGFACE_TOKEN", "HF_TOKEN"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Explicit,
    Environment(&'static str),
}

#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub value: String,
    pub source: TokenSource,
}

impl std::fmt::Debug for ResolvedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedToken")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

pub fn resolve_token(explicit: Option<&str>) -> Option<ResolvedToken> {
    resolve_token_with(explicit, |key| env::var(key).ok())
}

/// An explicit non-empty token wins, then the first non-empty variable in
/// [`TOKEN_ENV_VARS`]. Values are used as given; only the empty string counts
/// as unset. `None` means anonymous access.
pub fn resolve_token_with<F>(explicit: Option<&str>, lookup: F) -> Option<ResolvedToken>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = explicit.filter(|value| !value.is_empty()) {
        return Some(ResolvedToken {
            value: value.to_string(),
            source: TokenSource::Explicit,
        });
    }

    for &key in TOKEN_ENV_VARS {
        if let Some(value) = lookup(key).filter(|value| !value.is_empty()) {
            tracing::info!("Using token from ${key}");
            return Some(ResolvedToken {
                value,
                source: TokenSource::Environment(key),
            });
        }
    }
    None
}
