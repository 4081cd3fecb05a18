//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Failure raised by an enter or leave action.
///
/// Kept as a boxed trait object so the original error reaches the caller
/// untouched and can be recovered with `downcast_ref`.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a single action or of a whole traversal.
pub type ActionResult = Result<(), ActionError>;

/// Domain errors represent misuse of the step tree or its state.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("cleanup already registered for step: {0}")]
    CleanupAlreadyRegistered(String),

    #[error("state key not found: {0}")]
    MissingKey(String),

    #[error("state key {key} does not hold a value of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failed condition reported by an assertion-style action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("assertion failed: {message}")]
pub struct AssertionFailed {
    pub message: String,
}

/// Turn a condition into an action result.
///
/// ```
/// use steptree::domain::{ensure, State};
///
/// let mut state = State::new();
/// state.insert("c", 1_i32);
/// assert!(ensure(state.get::<i32>("c") == Some(&1), "c should be 1").is_ok());
/// assert!(ensure(state.is_empty(), "state should be empty").is_err());
/// ```
pub fn ensure(condition: bool, message: impl Into<String>) -> ActionResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(AssertionFailed {
            message: message.into(),
        }))
    }
}
