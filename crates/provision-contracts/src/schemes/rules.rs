use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;

pub(crate) const DEFAULT_EXACT_EXCLUDES: &[&str] = &["Yoga", "fmt"];

pub(crate) const DEFAULT_PREFIX_EXCLUDES: &[&str] = &[
    "Pods-",
    "boost",
    "React",
    "RN",
    "Expo",
    "EX",
    "RCT",
    "glog",
    "hermes",
    "libavif",
    "libdav1d",
    "libwebp",
    "lottie",
    "SDWebImage",
    "SocketRocket",
    "fast_float",
    "FBLazyVector",
    "Galeria",
    "ComputableLayout",
    "ContextMenu",
    "DGSwiftUtilities",
    "DoubleConversion",
    "EASClient",
    "llama-rn",
];

pub(crate) const DEFAULT_CONTAINS_EXCLUDES: &[&str] = &[
    "react-native",
    "ReactAppDependency",
    "ReactCodegen",
    "ReactCommon",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Exact,
    Prefix,
    Contains,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefix => "prefix",
            Self::Contains => "contains",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub kind: RuleKind,
    pub rule: &'a str,
}

/// Names of generated dependency and vendor targets that must never be picked
/// as the application scheme.
///
/// A scheme is excluded when it equals any `exact` entry, starts with any
/// `prefixes` entry, or contains any `contains` entry. Missing keys in a JSON
/// ruleset deserialize to empty lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExclusionRuleset {
    #[serde(default)]
    pub exact: Vec<String>,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub contains: Vec<String>,
}

impl ExclusionRuleset {
    pub fn new(exact: &[&str], prefixes: &[&str], contains: &[&str]) -> Self {
        let owned = |items: &[&str]| {
            items
                .iter()
                .map(|item| (*item).to_string())
                .collect::<Vec<String>>()
        };
        Self {
            exact: owned(exact),
            prefixes: owned(prefixes),
            contains: owned(contains),
        }
    }

    /// React Native / Expo pod targets that show up next to the app scheme.
    pub fn mobile_defaults() -> Self {
        Self::new(
            DEFAULT_EXACT_EXCLUDES,
            DEFAULT_PREFIX_EXCLUDES,
            DEFAULT_CONTAINS_EXCLUDES,
        )
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ProvisionError> {
        serde_json::from_str(raw)
            .map_err(|err| ProvisionError::malformed(format!("invalid exclusion ruleset: {err}")))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ProvisionError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ProvisionError::io(path, err))?;
        Self::from_json_str(&raw)
    }

    pub fn excludes(&self, name: &str) -> bool {
        self.matching_rule(name).is_some()
    }

    pub fn matching_rule(&self, name: &str) -> Option<RuleMatch<'_>> {
        if let Some(rule) = self.exact.iter().find(|rule| rule.as_str() == name) {
            return Some(RuleMatch {
                kind: RuleKind::Exact,
                rule,
            });
        }
        if let Some(rule) = self
            .prefixes
            .iter()
            .find(|prefix| name.starts_with(prefix.as_str()))
        {
            return Some(RuleMatch {
                kind: RuleKind::Prefix,
                rule,
            });
        }
        self.contains
            .iter()
            .find(|token| name.contains(token.as_str()))
            .map(|rule| RuleMatch {
                kind: RuleKind::Contains,
                rule,
            })
    }
}
