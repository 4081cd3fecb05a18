//! Step tree: enter, children, leave.

use std::fmt;

use tracing::{debug, trace, warn, Instrument};

use crate::domain::action::{Action, BoxFuture};
use crate::domain::error::{ActionError, ActionResult, DomainError, DomainResult};
use crate::domain::state::State;

const ROOT_NAME: &str = "root";

/// A node in a step tree.
///
/// Running a step invokes its enter action, then every child in attachment
/// order, then its leave action. The state is owned by the run, never by the
/// tree, so one tree can be executed any number of times.
///
/// ```
/// use steptree::domain::{sync_action, State, Step};
///
/// let mut root = Step::new();
/// let first = root.attach(sync_action(|s: &mut State| s.insert("counter", 1_i32)));
/// first.set_cleanup(sync_action(|s: &mut State| {
///     *s.get_mut::<i32>("counter").unwrap() -= 1;
/// }));
/// first.attach(sync_action(|s: &mut State| {
///     *s.get_mut::<i32>("counter").unwrap() += 1;
/// }));
///
/// assert_eq!(root.step_count(), 3);
/// ```
pub struct Step<S = State> {
    name: String,
    enter: Option<Box<dyn Action<S>>>,
    leave: Option<Box<dyn Action<S>>>,
    children: Vec<Step<S>>,
}

/// One action invocation in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Enter(String),
    Leave(String),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Enter(name) => write!(f, "enter {}", name),
            Phase::Leave(name) => write!(f, "leave {}", name),
        }
    }
}

impl<S> Default for Step<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Step<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("enter", &self.enter.is_some())
            .field("leave", &self.leave.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl<S> Step<S> {
    /// Create an empty root step.
    pub fn new() -> Self {
        Self::named(ROOT_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enter: None,
            leave: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename this step, returning it for further chaining.
    pub fn with_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Append a child with an optional enter action and return it.
    ///
    /// The child is named `<parent>/<index>` until renamed.
    pub fn attach_child(&mut self, enter: Option<Box<dyn Action<S>>>) -> &mut Step<S> {
        let name = format!("{}/{}", self.name, self.children.len());
        trace!(parent = %self.name, child = %name, "attach");
        self.children.push(Step {
            name,
            enter,
            leave: None,
            children: Vec::new(),
        });
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Append a child running `enter` on entry.
    pub fn attach(&mut self, enter: impl Action<S> + 'static) -> &mut Step<S> {
        self.attach_child(Some(Box::new(enter)))
    }

    /// Append a child with no enter action, useful for grouping.
    pub fn attach_empty(&mut self) -> &mut Step<S> {
        self.attach_child(None)
    }

    /// Register the leave action. A previous registration is replaced.
    pub fn set_cleanup(&mut self, leave: impl Action<S> + 'static) -> &mut Self {
        if self.leave.is_some() {
            warn!(step = %self.name, "replacing previously registered cleanup");
        }
        self.leave = Some(Box::new(leave));
        self
    }

    /// Register the leave action, refusing to replace an existing one.
    pub fn try_set_cleanup(&mut self, leave: impl Action<S> + 'static) -> DomainResult<&mut Self> {
        if self.leave.is_some() {
            return Err(DomainError::CleanupAlreadyRegistered(self.name.clone()));
        }
        self.leave = Some(Box::new(leave));
        Ok(self)
    }

    pub fn has_enter(&self) -> bool {
        self.enter.is_some()
    }

    pub fn has_cleanup(&self) -> bool {
        self.leave.is_some()
    }

    pub fn children(&self) -> &[Step<S>] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Step<S>> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Step<S>> {
        self.children.get_mut(index)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of levels, counting this step as one.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Number of steps in this subtree, including this one.
    pub fn step_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.step_count()).sum::<usize>()
    }

    /// Pre-order iterator over this subtree.
    pub fn iter(&self) -> StepIter<'_, S> {
        StepIter { stack: vec![self] }
    }

    /// The action invocations a successful run performs, in order.
    pub fn schedule(&self) -> Vec<Phase> {
        let mut phases = Vec::new();
        self.collect_phases(&mut phases);
        phases
    }

    fn collect_phases(&self, phases: &mut Vec<Phase>) {
        if self.enter.is_some() {
            phases.push(Phase::Enter(self.name.clone()));
        }
        for child in &self.children {
            child.collect_phases(phases);
        }
        if self.leave.is_some() {
            phases.push(Phase::Leave(self.name.clone()));
        }
    }
}

impl<S: Send> Step<S> {
    /// Run this subtree against a caller-owned state.
    ///
    /// The first failing action aborts the run. Its error is returned
    /// unchanged and nothing after it executes: not the failing step's
    /// children or cleanup, not its later siblings, and not the cleanup of
    /// any ancestor.
    pub fn execute_with<'a>(&'a self, state: &'a mut S) -> BoxFuture<'a, ActionResult> {
        let span = tracing::debug_span!("step", name = %self.name);
        Box::pin(
            async move {
                if let Some(enter) = &self.enter {
                    trace!("enter");
                    enter
                        .invoke(state)
                        .resolve()
                        .await
                        .inspect_err(|e| debug!(phase = "enter", error = %e, "action failed"))?;
                }

                for child in &self.children {
                    child.execute_with(state).await?;
                }

                if let Some(leave) = &self.leave {
                    trace!("leave");
                    leave
                        .invoke(state)
                        .resolve()
                        .await
                        .inspect_err(|e| debug!(phase = "leave", error = %e, "action failed"))?;
                }
                Ok(())
            }
            .instrument(span),
        )
    }

    /// Run this subtree starting from an empty state and return the final state.
    pub async fn execute(&self) -> Result<S, ActionError>
    where
        S: Default,
    {
        let mut state = S::default();
        self.execute_with(&mut state).await?;
        debug!(step = %self.name, "run complete");
        Ok(state)
    }
}

/// Pre-order, left-to-right traversal of a step tree.
pub struct StepIter<'a, S> {
    stack: Vec<&'a Step<S>>,
}

impl<'a, S> Iterator for StepIter<'a, S> {
    type Item = &'a Step<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Reverse so the leftmost child is popped first
        for child in current.children.iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}
