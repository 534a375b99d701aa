use std::io::Read;

use serde_json::{Map, Value};

use crate::error::ProvisionError;

const CONTAINER_KEYS: &[&str] = &["workspace", "project"];

/// Scheme names listed by the build-introspection tool, in the order it
/// printed them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemeReport {
    schemes: Vec<String>,
}

impl SchemeReport {
    pub fn new(schemes: Vec<String>) -> Self {
        Self { schemes }
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ProvisionError> {
        let mut raw = String::new();
        reader
            .read_to_string(&mut raw)
            .map_err(|err| ProvisionError::malformed(err.to_string()))?;
        Self::parse(&raw)
    }

    /// Parses `{"workspace": {"schemes": [...]}}` or `{"project": {...}}`.
    ///
    /// The workspace container wins over the project one unless it is absent,
    /// null or empty. A missing `schemes` list is an empty report.
    pub fn parse(raw: &str) -> Result<Self, ProvisionError> {
        let root: Value =
            serde_json::from_str(raw).map_err(|err| ProvisionError::malformed(err.to_string()))?;
        let Some(root) = root.as_object() else {
            return Err(ProvisionError::malformed("expected a JSON object"));
        };

        let Some(container) = select_container(root)? else {
            return Ok(Self::default());
        };

        let schemes = match container.get("schemes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ProvisionError::malformed(format!("scheme name is not a string: {item}"))
                    })
                })
                .collect::<Result<Vec<String>, ProvisionError>>()?,
            Some(other) => {
                return Err(ProvisionError::malformed(format!(
                    "`schemes` must be an array, got {other}"
                )))
            }
        };
        Ok(Self { schemes })
    }

    pub fn schemes(&self) -> &[String] {
        self.schemes.as_slice()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    /// Diagnostic line listing every scheme, or a `(none)` sentinel.
    pub fn availability_line(&self) -> String {
        if self.schemes.is_empty() {
            "Available schemes: (none)".to_string()
        } else {
            format!("Available schemes: {}", self.schemes.join(", "))
        }
    }
}

fn select_container(
    root: &Map<String, Value>,
) -> Result<Option<&Map<String, Value>>, ProvisionError> {
    for key in CONTAINER_KEYS {
        match root.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(map)) if map.is_empty() => continue,
            Some(Value::Object(map)) => return Ok(Some(map)),
            Some(_) => {
                return Err(ProvisionError::malformed(format!(
                    "`{key}` must be an object"
                )))
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::SchemeReport;
    use crate::error::ProvisionError;

    #[test]
    fn workspace_takes_precedence_over_project() -> anyhow::Result<()> {
        let report = SchemeReport::parse(
            r#"{"workspace": {"schemes": ["App", "Pods-App"]}, "project": {"schemes": ["Other"]}}"#,
        )?;
        assert_eq!(report.schemes(), ["App", "Pods-App"]);
        Ok(())
    }

    #[test]
    fn empty_workspace_falls_back_to_project() -> anyhow::Result<()> {
        let report =
            SchemeReport::parse(r#"{"workspace": {}, "project": {"schemes": ["Standalone"]}}"#)?;
        assert_eq!(report.schemes(), ["Standalone"]);
        Ok(())
    }

    #[test]
    fn missing_containers_yield_empty_report() -> anyhow::Result<()> {
        assert!(SchemeReport::parse("{}")?.is_empty());
        assert!(SchemeReport::parse(r#"{"project": {"name": "App"}}"#)?.is_empty());
        assert!(SchemeReport::parse(r#"{"project": {"schemes": null}}"#)?.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = SchemeReport::parse("xcodebuild: error").unwrap_err();
        assert!(matches!(err, ProvisionError::MalformedReport { .. }));
    }

    #[test]
    fn non_string_scheme_is_malformed() {
        let err = SchemeReport::parse(r#"{"project": {"schemes": ["App", 3]}}"#).unwrap_err();
        assert!(err.to_string().contains("scheme name is not a string: 3"));
    }

    #[test]
    fn top_level_array_is_malformed() {
        let err = SchemeReport::parse(r#"["App"]"#).unwrap_err();
        assert!(matches!(err, ProvisionError::MalformedReport { .. }));
    }

    #[test]
    fn availability_line_uses_sentinel_when_empty() {
        assert_eq!(
            SchemeReport::default().availability_line(),
            "Available schemes: (none)"
        );
        assert_eq!(
            SchemeReport::new(vec!["A".to_string(), "B".to_string()]).availability_line(),
            "Available schemes: A, B"
        );
    }

    #[test]
    fn reads_report_from_reader() -> anyhow::Result<()> {
        let input = br#"{"project": {"schemes": ["App"]}}"#;
        let report = SchemeReport::from_reader(&input[..])?;
        assert_eq!(report.schemes(), ["App"]);
        Ok(())
    }
}
