//! Entry points for external test runners.
//!
//! A runner only needs a zero-argument callable. [`EntryPoint`] supplies one
//! for async callers ([`EntryPoint::call`]) and one for plain `#[test]`
//! functions ([`EntryPoint::call_blocking`]).

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, instrument};

use crate::config::{RuntimeConfig, RuntimeFlavor};
use crate::domain::{ActionError, ActionResult, BoxFuture, State, Step};

use super::{ApplicationError, ApplicationResult};

/// Build the tokio runtime described by `config`.
#[instrument(level = "debug")]
pub fn build_runtime(config: &RuntimeConfig) -> ApplicationResult<Runtime> {
    let mut builder = match config.flavor {
        RuntimeFlavor::CurrentThread => Builder::new_current_thread(),
        RuntimeFlavor::MultiThread => {
            let mut builder = Builder::new_multi_thread();
            if let Some(threads) = config.worker_threads {
                if threads == 0 {
                    return Err(ApplicationError::Config {
                        message: "runtime.worker_threads must be at least 1".into(),
                    });
                }
                builder.worker_threads(threads);
            }
            builder
        }
    };
    builder
        .enable_all()
        .build()
        .map_err(|source| ApplicationError::Runtime {
            context: format!("{:?}", config.flavor),
            source,
        })
}

/// Run `tree` to completion from synchronous code and return the final state.
///
/// Must not be called from inside a tokio runtime; use [`Step::execute`] there.
pub fn run_blocking<S>(tree: &Step<S>, runtime: &RuntimeConfig) -> Result<S, ActionError>
where
    S: Default + Send,
{
    let rt = build_runtime(runtime)?;
    rt.block_on(tree.execute())
}

/// Zero-argument adapter around a finished step tree.
///
/// Every call starts from a fresh, empty state.
///
/// ```
/// use steptree::domain::{ensure, sync_action, State, Step};
///
/// let mut root = Step::new();
/// root.attach(sync_action(|s: &mut State| s.insert("counter", 1_i32)));
/// root.set_cleanup(sync_action(|s: &mut State| ensure(s.get::<i32>("counter") == Some(&1), "counter")));
///
/// let entry = root.create_entry_point();
/// entry.call_blocking().unwrap();
/// ```
pub struct EntryPoint<S = State> {
    tree: Arc<Step<S>>,
    runtime: RuntimeConfig,
}

impl<S> Clone for EntryPoint<S> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            runtime: self.runtime.clone(),
        }
    }
}

impl<S> EntryPoint<S>
where
    S: Default + Send + 'static,
{
    pub fn new(tree: Step<S>) -> Self {
        Self {
            tree: Arc::new(tree),
            runtime: RuntimeConfig::default(),
        }
    }

    /// Use `runtime` for [`EntryPoint::call_blocking`].
    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn tree(&self) -> &Step<S> {
        &self.tree
    }

    /// Execute the tree; awaitable from any async runner.
    pub fn call(&self) -> BoxFuture<'static, ActionResult> {
        let tree = Arc::clone(&self.tree);
        Box::pin(async move {
            info!(tree = %tree.name(), "running step tree");
            tree.execute().await?;
            Ok(())
        })
    }

    /// Execute the tree on a runtime built from the configured [`RuntimeConfig`].
    pub fn call_blocking(&self) -> ActionResult {
        debug!(tree = %self.tree.name(), runtime = ?self.runtime, "running step tree (blocking)");
        run_blocking(&self.tree, &self.runtime)?;
        Ok(())
    }

    /// Turn this entry point into a plain closure.
    pub fn into_fn(self) -> impl Fn() -> BoxFuture<'static, ActionResult> + Clone + Send + Sync {
        move || self.call()
    }
}

impl<S> Step<S>
where
    S: Default + Send + 'static,
{
    /// Freeze this tree into an [`EntryPoint`].
    pub fn create_entry_point(self) -> EntryPoint<S> {
        EntryPoint::new(self)
    }
}
