//! Domain layer: step tree, actions and shared state
//!
//! This layer is independent of external concerns (no runtime, no config loading).

pub mod action;
pub mod error;
pub mod state;
pub mod step;
pub mod tree_traits;

pub use action::{
    async_action, sync_action, Action, AsyncAction, BoxFuture, IntoActionResult, Outcome,
    SyncAction,
};
pub use error::{ensure, ActionError, ActionResult, AssertionFailed, DomainError, DomainResult};
pub use state::State;
pub use step::{Phase, Step, StepIter};
pub use tree_traits::ToTermTree;
