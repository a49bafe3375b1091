//! Findings and the rules that produce them

pub mod finding;
pub mod rules;

pub use finding::{Finding, IssueKey, Severity};
pub use rules::{Declarations, RULES, RuleContext, RuleMetadata, run_rules};
