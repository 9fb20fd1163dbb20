//! Result and error types for atspi-e2e.

use thiserror::Error;

use crate::attribute::AttributeError;

/// Result type for atspi-e2e operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors that can occur while driving an application under test
#[derive(Debug, Error)]
pub enum E2eError {
    /// Attribute lookup promoted to a fatal error (see [`crate::fail_on_error`])
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    /// The target widget does not provide the requested action
    #[error("widget {node} has no action named '{action}', got: {}", .available.join(","))]
    ActionNotFound {
        /// Display form of the widget
        node: String,
        /// Requested action name
        action: String,
        /// Actions the widget does provide
        available: Vec<String>,
    },

    /// No widget to act upon
    #[error("no widget to perform '{action}' on")]
    EmptyTargetSet {
        /// Requested action name
        action: String,
    },

    /// More than one widget matched where exactly one was required
    #[error("ambiguous target for '{action}', {} widgets matched: {}", .matches.len(), .matches.join(", "))]
    AmbiguousTarget {
        /// Requested action name
        action: String,
        /// Display form of every matched widget
        matches: Vec<String>,
    },

    /// No descendant matched the conditions
    #[error("no widget from {root} with {conditions}{hint}")]
    NotFound {
        /// Display form of the search root
        root: String,
        /// Conditions that were searched for
        conditions: String,
        /// Extra help, possibly empty
        hint: String,
    },

    /// The launched application never showed up on the desktop
    #[error("there is no application {path} named '{name}' in the desktop")]
    ApplicationNotFound {
        /// Command that was launched
        path: String,
        /// Name the application was expected to register
        name: String,
    },

    /// Expectation failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Diagnostic with the actual state of every candidate
        message: String,
    },

    /// A condition value does not fit its condition name
    #[error("invalid condition '{name}': {message}")]
    InvalidCondition {
        /// Condition name
        name: String,
        /// What is wrong with it
        message: String,
    },

    /// An operation that needs at least one condition got none
    #[error("{operation} needs at least one condition, got 0")]
    MissingConditions {
        /// Operation that was called
        operation: String,
    },

    /// A reserved condition without defined semantics
    #[error("condition '{name}' is not supported")]
    UnsupportedCondition {
        /// Condition name
        name: String,
    },

    /// The accessibility service failed
    #[error("Accessibility backend error: {message}")]
    Backend {
        /// Error message
        message: String,
    },

    /// The subject process could not be started
    #[error("Failed to launch {path}: {source}")]
    Launch {
        /// Command that was launched
        path: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl E2eError {
    /// Create a backend error
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create an invalid condition error
    #[must_use]
    pub fn invalid_condition(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCondition {
            name: name.into(),
            message: message.into(),
        }
    }
}
