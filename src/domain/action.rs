//! Enter and leave actions.
//!
//! An action is anything that can be invoked with the shared state and either
//! finishes on the spot or hands back a future that must be awaited. Both
//! shapes are reported through [`Outcome`], so the traversal resolves them with
//! a single code path.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use crate::domain::error::{ActionError, ActionResult};

/// Boxed, sendable future borrowing for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What an action returned at its call site.
pub enum Outcome<'a> {
    /// The action completed synchronously.
    Ready(ActionResult),
    /// The action suspended; the future must be driven to completion.
    Pending(BoxFuture<'a, ActionResult>),
}

impl<'a> Outcome<'a> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }

    /// Wait for the action to finish, whichever shape it had.
    pub async fn resolve(self) -> ActionResult {
        match self {
            Outcome::Ready(result) => result,
            Outcome::Pending(future) => future.await,
        }
    }
}

/// A step action invoked with the shared state.
pub trait Action<S>: Send + Sync {
    fn invoke<'a>(&'a self, state: &'a mut S) -> Outcome<'a>;
}

impl<S> Action<S> for Box<dyn Action<S>> {
    fn invoke<'a>(&'a self, state: &'a mut S) -> Outcome<'a> {
        (**self).invoke(state)
    }
}

/// Return values accepted from synchronous actions.
pub trait IntoActionResult {
    fn into_action_result(self) -> ActionResult;
}

impl IntoActionResult for () {
    fn into_action_result(self) -> ActionResult {
        Ok(())
    }
}

impl<E> IntoActionResult for Result<(), E>
where
    E: Into<ActionError>,
{
    fn into_action_result(self) -> ActionResult {
        self.map_err(Into::into)
    }
}

/// Synchronous action built from a closure.
pub struct SyncAction<F, R> {
    f: F,
    _returns: PhantomData<fn() -> R>,
}

impl<S, F, R> Action<S> for SyncAction<F, R>
where
    F: Fn(&mut S) -> R + Send + Sync,
    R: IntoActionResult,
{
    fn invoke<'a>(&'a self, state: &'a mut S) -> Outcome<'a> {
        Outcome::Ready((self.f)(state).into_action_result())
    }
}

/// Asynchronous action built from a closure returning a boxed future.
pub struct AsyncAction<F> {
    f: F,
}

impl<S, F> Action<S> for AsyncAction<F>
where
    F: for<'s> Fn(&'s mut S) -> BoxFuture<'s, ActionResult> + Send + Sync,
{
    fn invoke<'a>(&'a self, state: &'a mut S) -> Outcome<'a> {
        Outcome::Pending((self.f)(state))
    }
}

/// Wrap a plain closure returning `()` or `Result<(), E>`.
///
/// ```
/// use steptree::domain::{sync_action, State, Step};
///
/// let mut root = Step::new();
/// root.attach(sync_action(|state: &mut State| state.insert("counter", 1_i32)));
/// ```
pub fn sync_action<S, F, R>(f: F) -> SyncAction<F, R>
where
    F: Fn(&mut S) -> R + Send + Sync,
    R: IntoActionResult,
{
    SyncAction {
        f,
        _returns: PhantomData,
    }
}

/// Wrap a closure that returns a boxed future borrowing the state.
///
/// ```
/// use steptree::domain::{async_action, State, Step};
///
/// let mut root = Step::new();
/// root.attach(async_action(|state: &mut State| {
///     Box::pin(async move {
///         state.insert("counter", 1_i32);
///         Ok(())
///     })
/// }));
/// ```
pub fn async_action<S, F>(f: F) -> AsyncAction<F>
where
    F: for<'s> Fn(&'s mut S) -> BoxFuture<'s, ActionResult> + Send + Sync,
{
    AsyncAction { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ensure;
    use crate::domain::state::State;

    #[tokio::test]
    async fn given_sync_action_when_invoked_then_outcome_is_ready() {
        let action = sync_action(|state: &mut State| state.insert("counter", 1_i32));
        let mut state = State::new();

        let outcome = action.invoke(&mut state);
        assert!(!outcome.is_pending());
        outcome.resolve().await.unwrap();

        assert_eq!(state.get::<i32>("counter"), Some(&1));
    }

    #[tokio::test]
    async fn given_async_action_when_invoked_then_outcome_is_pending() {
        let action = async_action(|state: &mut State| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                state.insert("counter", 2_i32);
                Ok(())
            })
        });
        let mut state = State::new();

        let outcome = action.invoke(&mut state);
        assert!(outcome.is_pending());
        outcome.resolve().await.unwrap();

        assert_eq!(state.get::<i32>("counter"), Some(&2));
    }

    #[tokio::test]
    async fn given_failing_sync_action_when_resolved_then_error_is_unchanged() {
        let action = sync_action(|_: &mut State| ensure(false, "boom"));
        let mut state = State::new();

        let err = action.invoke(&mut state).resolve().await.unwrap_err();
        assert_eq!(err.to_string(), "assertion failed: boom");
    }

    #[tokio::test]
    async fn given_io_error_result_when_resolved_then_downcasts_to_io_error() {
        let action = sync_action(|_: &mut State| -> Result<(), std::io::Error> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "fixture"))
        });
        let mut state = State::new();

        let err = action.invoke(&mut state).resolve().await.unwrap_err();
        let io = err.downcast_ref::<std::io::Error>().expect("io::Error");
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }
}
