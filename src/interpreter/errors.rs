//! Runtime error types for the script sandbox
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during script execution (as opposed to parse errors).
//!
//! All runtime errors are fatal: they abort the run and no partial trace is kept.

use crate::parser::ast::SourceLocation;
use std::fmt;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Reference to a name that is not in scope
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },

    /// Call to a function that is neither a script function nor a built-in
    UndefinedFunction {
        name: String,
        location: SourceLocation,
    },

    /// Assignment to a `const` binding
    ConstModification {
        var: String,
        location: SourceLocation,
    },

    /// `let`/`const` of a name already declared in the same block
    Redeclaration {
        name: String,
        location: SourceLocation,
    },

    /// Operation applied to a value of the wrong type
    TypeError {
        message: String,
        location: SourceLocation,
    },

    /// Array index or length outside what the sandbox allows
    RangeError {
        message: String,
        location: SourceLocation,
    },

    /// Unsupported operation or feature
    UnsupportedOperation {
        message: String,
        location: SourceLocation,
    },

    /// No stack frame available
    NoStackFrame { location: SourceLocation },

    /// Recursion went deeper than the call budget
    CallDepthExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// Statements and expressions nested deeper than the evaluator allows
    NestingTooDeep {
        limit: usize,
        location: SourceLocation,
    },

    /// The run allocated more than its memory budget
    AllocationLimitExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// More statements were evaluated than the statement budget allows
    StatementLimitExceeded { limit: usize },

    /// The checkpoint hook refused to record more steps
    CheckpointLimitExceeded { limit: usize },
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::UndefinedVariable { location, .. } => Some(location),
            RuntimeError::UndefinedFunction { location, .. } => Some(location),
            RuntimeError::ConstModification { location, .. } => Some(location),
            RuntimeError::Redeclaration { location, .. } => Some(location),
            RuntimeError::TypeError { location, .. } => Some(location),
            RuntimeError::RangeError { location, .. } => Some(location),
            RuntimeError::UnsupportedOperation { location, .. } => Some(location),
            RuntimeError::NoStackFrame { location } => Some(location),
            RuntimeError::CallDepthExceeded { location, .. } => Some(location),
            RuntimeError::NestingTooDeep { location, .. } => Some(location),
            RuntimeError::AllocationLimitExceeded { location, .. } => Some(location),
            RuntimeError::StatementLimitExceeded { .. } => None,
            RuntimeError::CheckpointLimitExceeded { .. } => None,
        }
    }

    /// Budget exhaustion rather than a fault in the script itself
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            RuntimeError::StatementLimitExceeded { .. }
                | RuntimeError::CheckpointLimitExceeded { .. }
                | RuntimeError::CallDepthExceeded { .. }
                | RuntimeError::NestingTooDeep { .. }
                | RuntimeError::AllocationLimitExceeded { .. }
        )
    }

    pub(crate) fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::UnsupportedOperation {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UndefinedVariable { name, location } => {
                write!(f, "'{}' is not defined at line {}", name, location.line)
            }
            RuntimeError::UndefinedFunction { name, location } => {
                write!(f, "Undefined function '{}' at line {}", name, location.line)
            }
            RuntimeError::ConstModification { var, location } => {
                write!(
                    f,
                    "Assignment to constant variable '{}' at line {}",
                    var, location.line
                )
            }
            RuntimeError::Redeclaration { name, location } => {
                write!(
                    f,
                    "Identifier '{}' has already been declared at line {}",
                    name, location.line
                )
            }
            RuntimeError::TypeError { message, location } => {
                write!(f, "TypeError: {} at line {}", message, location.line)
            }
            RuntimeError::RangeError { message, location } => {
                write!(f, "RangeError: {} at line {}", message, location.line)
            }
            RuntimeError::UnsupportedOperation { message, location } => {
                write!(
                    f,
                    "Unsupported operation: {} at line {}",
                    message, location.line
                )
            }
            RuntimeError::NoStackFrame { location } => {
                write!(f, "No stack frame available at line {}", location.line)
            }
            RuntimeError::CallDepthExceeded { limit, location } => {
                write!(
                    f,
                    "Maximum call depth of {} exceeded at line {}",
                    limit, location.line
                )
            }
            RuntimeError::NestingTooDeep { limit, location } => {
                write!(
                    f,
                    "Evaluation nested more than {} levels deep at line {}",
                    limit, location.line
                )
            }
            RuntimeError::AllocationLimitExceeded { limit, location } => {
                write!(
                    f,
                    "Allocation budget of {} elements exceeded at line {}",
                    limit, location.line
                )
            }
            RuntimeError::StatementLimitExceeded { limit } => {
                write!(
                    f,
                    "Execution stopped after {} statements (possible infinite loop)",
                    limit
                )
            }
            RuntimeError::CheckpointLimitExceeded { limit } => {
                write!(f, "Execution recorded more than {} steps", limit)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
