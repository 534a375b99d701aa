mod report;
mod rules;
mod selector;

pub use report::SchemeReport;
pub use rules::{ExclusionRuleset, RuleKind, RuleMatch};
pub use selector::{SchemeSelection, SchemeSelector};
