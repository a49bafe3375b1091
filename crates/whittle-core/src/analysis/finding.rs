//! Findings reported by the lint engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warnings that should be addressed
    Warning,
    /// Errors that must be fixed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Identity of a finding: rule, file and start position
///
/// Two findings with the same key are the same issue, wherever they came
/// from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IssueKey(String);

impl IssueKey {
    pub fn new(rule_id: &str, file: &str, line: usize, column: usize) -> Self {
        Self(format!("{rule_id}-{file}:{line}:{column}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One issue reported against one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule that reported the finding
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub file: PathBuf,
    /// Byte offset of the target node's first token
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            file: file.into(),
            offset: 0,
            line: 0,
            column: 0,
        }
    }

    pub fn at(mut self, offset: usize, line: usize, column: usize) -> Self {
        self.offset = offset;
        self.line = line;
        self.column = column;
        self
    }

    /// Key of this finding where it was reported
    pub fn key(&self) -> IssueKey {
        IssueKey::new(
            &self.rule_id,
            &self.file.display().to_string(),
            self.line,
            self.column,
        )
    }

    /// Key the same finding would have at another position
    pub fn key_at(&self, file: &str, line: usize, column: usize) -> IssueKey {
        IssueKey::new(&self.rule_id, file, line, column)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.file.display(),
            self.line,
            self.column,
            self.severity,
            self.rule_id,
            self.message
        )
    }
}
