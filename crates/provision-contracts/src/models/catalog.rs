use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ProvisionError;

/// Request token that expands to every catalog identifier.
pub const ALL_MODELS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    pub identifier: String,
    pub repository: String,
    pub filename: String,
}

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: IndexMap<String, ModelEntry>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ModelCatalog {
    pub fn new(models: Option<IndexMap<String, ModelEntry>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&ModelEntry> {
        self.models.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.models.contains_key(identifier)
    }

    /// Entries ordered by identifier.
    pub fn list(&self) -> Vec<&ModelEntry> {
        let mut entries = self.models.values().collect::<Vec<&ModelEntry>>();
        entries.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        entries
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.list()
            .into_iter()
            .map(|entry| entry.identifier.clone())
            .collect()
    }

    /// Normalizes a comma separated request such as `"Qwen2-0.5B, phi-3-mini"`.
    pub fn normalize_request(&self, raw: &str) -> Result<Vec<String>, ProvisionError> {
        let tokens = raw.split(',').collect::<Vec<&str>>();
        self.normalize(tokens.as_slice())
    }

    /// Trims and lowercases every token, drops blanks and duplicates while
    /// keeping first-seen order. `all` anywhere in the request yields every
    /// identifier in sorted order and the other tokens are not looked at.
    /// Otherwise unknown tokens are reported together, sorted and deduplicated.
    pub fn normalize<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> Result<Vec<String>, ProvisionError> {
        let requested = tokens
            .iter()
            .map(|token| token.as_ref().trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect::<Vec<String>>();
        if requested.is_empty() {
            return Err(ProvisionError::EmptyRequest);
        }

        if requested.iter().any(|token| token == ALL_MODELS) {
            return Ok(self.identifiers());
        }

        let mut unknown = requested
            .iter()
            .filter(|token| !self.contains(token.as_str()))
            .cloned()
            .collect::<Vec<String>>();
        if !unknown.is_empty() {
            unknown.sort();
            unknown.dedup();
            return Err(ProvisionError::UnknownIdentifier {
                identifiers: unknown,
            });
        }

        let mut normalized: Vec<String> = Vec::with_capacity(requested.len());
        for token in requested {
            if !normalized.contains(&token) {
                normalized.push(token);
            }
        }
        Ok(normalized)
    }
}

fn default_models() -> IndexMap<String, ModelEntry> {
    let mut map = IndexMap::new();

    let mut insert = |identifier: &str, repository: &str, filename: &str| {
        map.insert(
            identifier.to_string(),
            ModelEntry {
                identifier: identifier.to_string(),
                repository: repository.to_string(),
                filename: filename.to_string(),
            },
        );
    };

    insert(
        "qwen2-0.5b",
        "Qwen/Qwen2-0.5B-Instruct-GGUF",
        "qwen2-0_5b-instruct-q4_k_m.gguf",
    );
    insert(
        "llama-3.2-1b",
        "ggml-org/Llama-3.2-1B-Instruct-GGUF",
        "Llama-3.2-1B-Instruct-Q4_K_M.gguf",
    );
    insert(
        "smollm2-1.7b",
        "HuggingFaceTB/SmolLM2-1.7B-Instruct-GGUF",
        "smollm2-1.7b-instruct-q4_k_m.gguf",
    );
    insert(
        "phi-3-mini",
        "microsoft/Phi-3-mini-4k-instruct-gguf",
        "Phi-3-mini-4k-instruct-q4.gguf",
    );

    map
}
