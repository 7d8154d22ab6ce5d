//! Constraint violation model.
//!
//! Violations are ephemeral: validators produce them while evaluating a
//! candidate and nothing persists them.

use serde::{Deserialize, Serialize};

/// Whether a violated constraint disqualifies the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    /// Candidate is disqualified.
    Hard,
    /// Informational; affects desirability only.
    Soft,
}

/// How loudly a violation should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationSeverity {
    Warning,
    Error,
}

/// A constraint violated by a (slot, resource) candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Constraint key that produced the violation.
    pub key: String,
    /// Constraint value as stored.
    pub value: String,
    /// Hard or soft.
    pub constraint_type: ConstraintType,
    /// Reporting severity.
    pub severity: ViolationSeverity,
    /// Human-readable description.
    pub message: String,
    /// Optional diagnostic detail (parse errors, offending values).
    pub details: Option<String>,
}

impl ConstraintViolation {
    /// Hard violation reported as an error.
    pub fn hard(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            constraint_type: ConstraintType::Hard,
            severity: ViolationSeverity::Error,
            message: message.into(),
            details: None,
        }
    }

    /// Soft violation reported as a warning.
    pub fn soft(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            constraint_type: ConstraintType::Soft,
            severity: ViolationSeverity::Warning,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches diagnostic detail.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Whether this violation disqualifies the candidate.
    #[inline]
    pub fn is_hard(&self) -> bool {
        self.constraint_type == ConstraintType::Hard
    }
}
