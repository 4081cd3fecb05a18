//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add runner-level context.
///
/// Action failures are deliberately absent: they travel as
/// [`ActionError`](crate::domain::ActionError) so callers see the original value.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("failed to start runtime: {context}")]
    Runtime {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
