//! Issue/fix data model and the fix-application orchestrator.
//!
//! Detection (in `taglint-linter`) produces [`Issue`]s, some carrying a
//! [`Fix`]; [`apply_fixes`] settles every fix-bearing issue into exactly one
//! terminal resolution. Detection and remediation are strictly
//! phase-separated: no fix runs while the tree is being traversed.

mod fix;
mod issue;
mod orchestrator;

pub use fix::{Fix, FixError};
pub use issue::{Issue, IssueKind, IssueList, Location, Resolution, Severity};
pub use orchestrator::apply_fixes;
