//! Typed issues produced by detection and settled by the orchestrator.

use crate::fix::Fix;
use taglint_tree::{NodeId, PageNumber};

/// What kind of violation an issue reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    UnknownRole,
    WrongParent,
    WrongChildCount,
    WrongChild,
    WrongChildPattern,
    EmptyNode,
    UngroupedPageContent,
    RoleMapCycle,
    MalformedTree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

/// Where in the document an issue was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Document,
    Node(NodeId),
    Page(PageNumber),
}

/// Terminal-once resolution state of an issue.
///
/// `Open` is the only non-terminal state; the first transition wins and
/// later ones are rejected (see [`Issue::resolve`] and friends).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Open,
    Resolved(String),
    Failed(String),
    Skipped(String),
}

/// One detected violation, optionally carrying a remediation fix.
///
/// The payload (kind, location, message, fix) is immutable after detection;
/// only the resolution state changes, and only through the orchestrator.
#[derive(Debug, Clone)]
pub struct Issue {
    kind: IssueKind,
    severity: Severity,
    location: Location,
    message: String,
    fix: Option<Fix>,
    resolution: Resolution,
}

impl Issue {
    #[must_use]
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            location,
            message: message.into(),
            fix: None,
            resolution: Resolution::Open,
        }
    }

    #[must_use]
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> IssueKind {
        self.kind
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Override the severity (configuration-driven).
    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn fix(&self) -> Option<&Fix> {
        self.fix.as_ref()
    }

    #[must_use]
    pub const fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.resolution, Resolution::Open)
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved(_))
    }

    /// Mark the issue resolved. Returns false (and leaves the state
    /// unchanged) if a terminal state was already reached.
    pub fn resolve(&mut self, note: impl Into<String>) -> bool {
        self.transition(Resolution::Resolved(note.into()))
    }

    /// Mark the fix attempt as failed.
    pub fn fail(&mut self, note: impl Into<String>) -> bool {
        self.transition(Resolution::Failed(note.into()))
    }

    /// Mark the issue as superseded by an applied fix.
    pub fn skip(&mut self, note: impl Into<String>) -> bool {
        self.transition(Resolution::Skipped(note.into()))
    }

    fn transition(&mut self, next: Resolution) -> bool {
        if self.is_open() {
            self.resolution = next;
            true
        } else {
            tracing::error!(
                current = ?self.resolution,
                rejected = ?next,
                "issue already settled; second resolution transition rejected"
            );
            false
        }
    }
}

/// Append-only, ordered collection of issues.
///
/// Insertion order is the deterministic tie-break for equal-priority fixes,
/// so the list never reorders or removes entries.
#[derive(Debug, Clone, Default)]
pub struct IssueList {
    issues: Vec<Issue>,
}

impl IssueList {
    #[must_use]
    pub const fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Issue> {
        self.issues.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Issue> {
        self.issues.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    /// Fix-carrying issues with their positions in the list.
    pub fn fixable(&self) -> impl Iterator<Item = (usize, &Issue)> {
        self.issues
            .iter()
            .enumerate()
            .filter(|(_, issue)| issue.fix().is_some())
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Issue> {
        self.issues.iter_mut()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Issue] {
        &self.issues
    }
}

impl IntoIterator for IssueList {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a IssueList {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

impl FromIterator<Issue> for IssueList {
    fn from_iter<T: IntoIterator<Item = Issue>>(iter: T) -> Self {
        Self {
            issues: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_issue() -> Issue {
        Issue::new(
            IssueKind::EmptyNode,
            Severity::Warning,
            Location::Document,
            "test",
        )
    }

    #[test]
    fn first_transition_wins() {
        let mut issue = open_issue();
        assert!(issue.is_open());
        assert!(issue.resolve("done"));
        assert_eq!(*issue.resolution(), Resolution::Resolved("done".into()));
    }

    #[test]
    fn second_transition_is_rejected() {
        let mut issue = open_issue();
        assert!(issue.fail("boom"));
        assert!(!issue.resolve("done"));
        assert!(!issue.skip("later"));
        assert_eq!(*issue.resolution(), Resolution::Failed("boom".into()));
    }

    #[test]
    fn severity_override() {
        let mut issue = open_issue();
        issue.set_severity(Severity::Error);
        assert_eq!(issue.severity(), Severity::Error);
    }

    #[test]
    fn issue_list_preserves_order() {
        let mut list = IssueList::new();
        list.push(open_issue());
        let mut second = open_issue();
        second.set_severity(Severity::Info);
        list.push(second);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().severity(), Severity::Warning);
        assert_eq!(list.get(1).unwrap().severity(), Severity::Info);
    }
}
