//! Action dispatch: invoke a named accessible action on target widgets.
//!
//! ```
//! use atspi_e2e::conditions;
//! use atspi_e2e::mock::MockNode;
//! use atspi_e2e::{objects_in, perform};
//!
//! let window = MockNode::new("frame", "w")
//!     .with_child(MockNode::new("push button", "Contar").with_action("click"));
//! let buttons = objects_in(&window, &conditions![role = "push button"]).unwrap();
//! perform("click").on(&buttons).unwrap();
//! assert_eq!(buttons[0].invocations(), vec!["click"]);
//! ```

use tracing::{debug, warn};

use crate::node::{action_index, action_names, describe, Accessible};
use crate::result::{E2eError, E2eResult};

/// A named action, ready to be dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    name: String,
}

/// Prepare the action `name`
#[must_use]
pub fn perform(name: impl Into<String>) -> Action {
    Action { name: name.into() }
}

impl Action {
    /// Action name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the action on a single widget
    pub fn invoke<N: Accessible>(&self, node: &N) -> E2eResult<()> {
        let Some(index) = action_index(node, &self.name)? else {
            return Err(E2eError::ActionNotFound {
                node: describe(node)?,
                action: self.name.clone(),
                available: action_names(node)?,
            });
        };
        let done = node.do_action(index)?;
        if done {
            debug!(action = %self.name, index, "action performed");
        } else {
            warn!(action = %self.name, node = %describe(node)?, "backend reported action as not performed");
        }
        Ok(())
    }

    /// Invoke on every widget, in order
    pub fn on_all<N: Accessible>(&self, nodes: &[N]) -> E2eResult<()> {
        for node in nodes {
            self.invoke(node)?;
        }
        Ok(())
    }

    /// Invoke on the first widget only
    pub fn on_first<N: Accessible>(&self, nodes: &[N]) -> E2eResult<()> {
        let Some(first) = nodes.first() else {
            return Err(self.empty());
        };
        self.invoke(first)
    }

    /// Invoke on the only widget.
    ///
    /// Fails without touching any widget when the set is empty or holds more
    /// than one widget.
    pub fn on<N: Accessible>(&self, nodes: &[N]) -> E2eResult<()> {
        match nodes {
            [] => Err(self.empty()),
            [node] => self.invoke(node),
            many => Err(E2eError::AmbiguousTarget {
                action: self.name.clone(),
                matches: many.iter().map(display_or_placeholder).collect(),
            }),
        }
    }

    fn empty(&self) -> E2eError {
        E2eError::EmptyTargetSet {
            action: self.name.clone(),
        }
    }
}

/// Display form of `node`, or a placeholder when the backend cannot tell
fn display_or_placeholder<N: Accessible>(node: &N) -> String {
    describe(node).unwrap_or_else(|e| {
        debug!(error = %e, "could not describe widget");
        UNREADABLE_WIDGET.to_string()
    })
}

const UNREADABLE_WIDGET: &str = "<unreadable widget>";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNode;

    fn button(name: &str) -> MockNode {
        MockNode::new("push button", name)
            .with_action("press")
            .with_action("click")
    }

    #[test]
    fn test_on_single_target() {
        let b = button("Contar");
        perform("click").on(&[b.clone()]).unwrap();
        assert_eq!(b.invocations(), vec!["click"]);
    }

    #[test]
    fn test_on_empty() {
        let err = perform("click").on::<MockNode>(&[]).unwrap_err();
        assert!(matches!(err, E2eError::EmptyTargetSet { .. }));
    }

    #[test]
    fn test_on_ambiguous_has_no_side_effects() {
        let a = button("A");
        let b = button("B");
        let err = perform("click").on(&[a.clone(), b.clone()]).unwrap_err();
        match err {
            E2eError::AmbiguousTarget { matches, .. } => {
                assert_eq!(matches, vec!["push button('A')", "push button('B')"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(a.invocations().is_empty());
        assert!(b.invocations().is_empty());
    }

    #[test]
    fn test_ambiguity_survives_unreadable_widget() {
        let a = button("A");
        let b = button("B");
        b.set_unreachable(true);
        let err = perform("click").on(&[a.clone(), b]).unwrap_err();
        match err {
            E2eError::AmbiguousTarget { matches, .. } => {
                assert_eq!(matches, vec!["push button('A')", UNREADABLE_WIDGET]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(a.invocations().is_empty());
    }

    #[test]
    fn test_on_all_in_order() {
        let a = button("A");
        let b = button("B");
        perform("press").on_all(&[a.clone(), b.clone(), a.clone()]).unwrap();
        assert_eq!(a.invocations(), vec!["press", "press"]);
        assert_eq!(b.invocations(), vec!["press"]);
    }

    #[test]
    fn test_on_all_empty_is_noop() {
        perform("click").on_all::<MockNode>(&[]).unwrap();
    }

    #[test]
    fn test_on_first() {
        let a = button("A");
        let b = button("B");
        perform("click").on_first(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(a.invocations(), vec!["click"]);
        assert!(b.invocations().is_empty());
        assert!(matches!(
            perform("click").on_first::<MockNode>(&[]),
            Err(E2eError::EmptyTargetSet { .. })
        ));
    }

    #[test]
    fn test_unknown_action_lists_available() {
        let b = button("Contar");
        let err = perform("activate").on(&[b]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "widget push button('Contar') has no action named 'activate', got: press,click"
        );
    }

    #[test]
    fn test_handler_runs() {
        use std::cell::Cell;
        use std::rc::Rc;

        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let b = MockNode::new("push button", "Contar")
            .with_action_handler("click", move || counter.set(counter.get() + 1));
        perform("click").on(&[b.clone()]).unwrap();
        perform("click").on(&[b]).unwrap();
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn test_unperformed_action_is_not_an_error() {
        let b = button("Contar");
        b.set_action_result(false);
        perform("click").on(&[b.clone()]).unwrap();
        assert_eq!(b.invocations(), vec!["click"]);
    }
}
