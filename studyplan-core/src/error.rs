//! Typed errors for the planner core.
//!
//! Scoring and analytics never fail; these only cover building tasks from
//! user input and parsing enum names.

use thiserror::Error;

/// Why a task draft was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,

    #[error("due date is required")]
    MissingDueDate,

    #[error("estimated time must be at least 1 minute")]
    ZeroEstimate,
}

/// A status/priority/category name that is not one of the known values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}
