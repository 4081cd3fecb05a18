//! Hierarchical test sequencing.
//!
//! Build a tree of steps, each with an optional setup (enter) action, ordered
//! children and an optional cleanup (leave) action, then run it depth-first:
//! enter, children in attachment order, leave. One state value is threaded
//! through the whole run by mutable reference.
//!
//! ```
//! use steptree::domain::{ensure, sync_action, State, Step};
//!
//! let mut tree = Step::new();
//! let first = tree.attach(sync_action(|s: &mut State| s.insert("counter", 1_i32)));
//! first.set_cleanup(sync_action(|s: &mut State| {
//!     *s.require_mut::<i32>("counter")? -= 1;
//!     ensure(s.get::<i32>("counter") == Some(&0), "counter should be 0")
//! }));
//! let second = first.attach(sync_action(|s: &mut State| -> steptree::domain::ActionResult {
//!     *s.require_mut::<i32>("counter")? += 1;
//!     Ok(())
//! }));
//! second.set_cleanup(sync_action(|s: &mut State| -> steptree::domain::ActionResult {
//!     *s.require_mut::<i32>("counter")? -= 1;
//!     Ok(())
//! }));
//!
//! tree.create_entry_point().call_blocking().unwrap();
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod demo;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{run_blocking, EntryPoint};
pub use domain::{async_action, ensure, sync_action, ActionError, ActionResult, State, Step};
