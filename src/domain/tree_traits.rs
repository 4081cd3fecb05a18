/*
termtree::Tree is a foreign type, so rendering lives behind a local trait
instead of an inherent impl (E0116).
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::step::Step;

pub trait ToTermTree {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<S> ToTermTree for Step<S> {
    #[instrument(level = "trace", skip(self), fields(step = %self.name()))]
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();
        Tree::new(label(self)).with_leaves(leaves)
    }
}

fn label<S>(step: &Step<S>) -> String {
    let phases: Vec<&str> = [
        step.has_enter().then_some("enter"),
        step.has_cleanup().then_some("cleanup"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if phases.is_empty() {
        step.name().to_string()
    } else {
        format!("{} [{}]", step.name(), phases.join(", "))
    }
}
