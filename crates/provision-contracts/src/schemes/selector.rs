use std::io::Write;

use super::report::SchemeReport;
use super::rules::ExclusionRuleset;
use crate::error::ProvisionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeSelection {
    pub scheme: String,
    pub from_candidate: bool,
    /// Schemes skipped by the ruleset before the survivor was reached.
    pub rejected: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SchemeSelector {
    pub rules: ExclusionRuleset,
}

impl SchemeSelector {
    pub fn new(rules: Option<ExclusionRuleset>) -> Self {
        Self {
            rules: rules.unwrap_or_else(ExclusionRuleset::mobile_defaults),
        }
    }

    pub fn select(
        &self,
        schemes: &[String],
        candidate: Option<&str>,
    ) -> Result<String, ProvisionError> {
        self.select_detailed(schemes, candidate)
            .map(|selection| selection.scheme)
    }

    /// An explicit candidate listed in `schemes` wins even if the ruleset would
    /// exclude it. Otherwise the first scheme, in input order, that no rule
    /// excludes is chosen.
    pub fn select_detailed(
        &self,
        schemes: &[String],
        candidate: Option<&str>,
    ) -> Result<SchemeSelection, ProvisionError> {
        if let Some(candidate) = candidate.filter(|value| !value.is_empty()) {
            if schemes.iter().any(|scheme| scheme == candidate) {
                return Ok(SchemeSelection {
                    scheme: candidate.to_string(),
                    from_candidate: true,
                    rejected: Vec::new(),
                });
            }
        }

        let mut rejected = Vec::new();
        for scheme in schemes {
            if self.rules.excludes(scheme) {
                rejected.push(scheme.clone());
                continue;
            }
            return Ok(SchemeSelection {
                scheme: scheme.clone(),
                from_candidate: false,
                rejected,
            });
        }
        Err(ProvisionError::NoSchemeFound)
    }

    /// Writes the availability line to `diagnostics` before selecting, so the
    /// listing is visible whether or not a scheme survives.
    pub fn select_reported<W: Write>(
        &self,
        report: &SchemeReport,
        candidate: Option<&str>,
        diagnostics: &mut W,
    ) -> Result<SchemeSelection, ProvisionError> {
        writeln!(diagnostics, "{}", report.availability_line())
            .map_err(|err| ProvisionError::io("<diagnostics>", err))?;
        self.select_detailed(report.schemes(), candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::SchemeSelector;
    use crate::error::ProvisionError;
    use crate::schemes::{ExclusionRuleset, SchemeReport};

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_string()).collect()
    }

    #[test]
    fn skips_vendor_targets_and_keeps_first_app() {
        let selector = SchemeSelector::new(None);
        let schemes = names(&["Pods-App", "MyApp", "RCTFolly"]);
        assert_eq!(selector.select(&schemes, Some("")).unwrap(), "MyApp");
        assert_eq!(selector.select(&schemes, None).unwrap(), "MyApp");
    }

    #[test]
    fn candidate_in_report_wins() {
        let selector = SchemeSelector::new(None);
        let schemes = names(&["MyApp", "MyAppTests"]);
        let selection = selector
            .select_detailed(&schemes, Some("MyAppTests"))
            .unwrap();
        assert_eq!(selection.scheme, "MyAppTests");
        assert!(selection.from_candidate);
    }

    #[test]
    fn candidate_bypasses_exclusion_rules() {
        let selector = SchemeSelector::new(None);
        let schemes = names(&["React-Core", "Yoga", "MyApp"]);
        assert_eq!(selector.select(&schemes, Some("Yoga")).unwrap(), "Yoga");
    }

    #[test]
    fn candidate_missing_from_report_falls_back_to_scan() {
        let selector = SchemeSelector::new(None);
        let schemes = names(&["hermes-engine", "Shop", "Admin"]);
        let selection = selector.select_detailed(&schemes, Some("Ghost")).unwrap();
        assert_eq!(selection.scheme, "Shop");
        assert!(!selection.from_candidate);
        assert_eq!(selection.rejected, names(&["hermes-engine"]));
    }

    #[test]
    fn first_survivor_follows_input_order() {
        let selector = SchemeSelector::new(None);
        let schemes = names(&["Zeta", "Alpha"]);
        assert_eq!(selector.select(&schemes, None).unwrap(), "Zeta");
    }

    #[test]
    fn empty_report_has_no_scheme() {
        let selector = SchemeSelector::new(None);
        let err = selector.select(&[], Some("MyApp")).unwrap_err();
        assert!(matches!(err, ProvisionError::NoSchemeFound));
    }

    #[test]
    fn all_excluded_has_no_scheme() {
        let selector = SchemeSelector::new(None);
        let schemes = names(&["Pods-App", "fmt", "ReactCommon-Samples", "EXConstants"]);
        let err = selector.select(&schemes, None).unwrap_err();
        assert!(matches!(err, ProvisionError::NoSchemeFound));
    }

    #[test]
    fn custom_ruleset_is_honoured() {
        let selector = SchemeSelector::new(Some(ExclusionRuleset::new(&["MyApp"], &[], &[])));
        let schemes = names(&["MyApp", "Pods-App"]);
        assert_eq!(selector.select(&schemes, None).unwrap(), "Pods-App");
    }

    #[test]
    fn reported_selection_lists_schemes_even_on_failure() {
        let selector = SchemeSelector::new(None);
        let report = SchemeReport::new(names(&["Pods-App", "RNScreens"]));
        let mut diagnostics = Vec::new();
        let result = selector.select_reported(&report, None, &mut diagnostics);
        assert!(matches!(result, Err(ProvisionError::NoSchemeFound)));
        assert_eq!(
            String::from_utf8(diagnostics).unwrap(),
            "Available schemes: Pods-App, RNScreens\n"
        );
    }

    #[test]
    fn reported_selection_uses_none_sentinel() {
        let selector = SchemeSelector::new(None);
        let mut diagnostics = Vec::new();
        let _ = selector.select_reported(&SchemeReport::default(), None, &mut diagnostics);
        assert_eq!(
            String::from_utf8(diagnostics).unwrap(),
            "Available schemes: (none)\n"
        );
    }
}
