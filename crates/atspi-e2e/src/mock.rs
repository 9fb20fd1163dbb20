//! In-memory accessible tree for unit testing.
//!
//! [`MockNode`] is a shared handle: clones refer to the same widget, so a
//! test can keep a handle to a label and watch it change after an action
//! handler runs. [`MockDesktop`] lists mock applications and can delay their
//! registration to exercise the discovery poll.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::node::Accessible;
use crate::result::{E2eError, E2eResult};
use crate::session::Desktop;

// =============================================================================
// MOCK NODE
// =============================================================================

type Handler = Rc<dyn Fn()>;

struct MockAction {
    name: String,
    handler: Option<Handler>,
}

#[derive(Default)]
struct Inner {
    role: RefCell<String>,
    name: RefCell<String>,
    text: RefCell<Option<String>>,
    children: RefCell<Vec<MockNode>>,
    actions: RefCell<Vec<MockAction>>,
    properties: RefCell<BTreeMap<String, String>>,
    getters: RefCell<BTreeMap<String, String>>,
    interfaces: RefCell<Option<Vec<String>>>,
    invocations: RefCell<Vec<String>>,
    action_result: Cell<Option<bool>>,
    unreachable: Cell<bool>,
}

/// Mock widget
#[derive(Clone, Default)]
pub struct MockNode(Rc<Inner>);

impl MockNode {
    /// Create a widget with a role and a name
    #[must_use]
    pub fn new(role: impl Into<String>, name: impl Into<String>) -> Self {
        let node = Self::default();
        *node.0.role.borrow_mut() = role.into();
        *node.0.name.borrow_mut() = name.into();
        node
    }

    /// Give the widget text content
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Append a child
    #[must_use]
    pub fn with_child(self, child: Self) -> Self {
        self.add_child(child);
        self
    }

    /// Append children
    #[must_use]
    pub fn with_children(self, children: impl IntoIterator<Item = Self>) -> Self {
        self.0.children.borrow_mut().extend(children);
        self
    }

    /// Add an action without side effects
    #[must_use]
    pub fn with_action(self, name: impl Into<String>) -> Self {
        self.0.actions.borrow_mut().push(MockAction {
            name: name.into(),
            handler: None,
        });
        self
    }

    /// Add an action that runs `handler` when invoked
    #[must_use]
    pub fn with_action_handler(self, name: impl Into<String>, handler: impl Fn() + 'static) -> Self {
        self.0.actions.borrow_mut().push(MockAction {
            name: name.into(),
            handler: Some(Rc::new(handler)),
        });
        self
    }

    /// Set a direct property
    #[must_use]
    pub fn with_property(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.properties.borrow_mut().insert(name.into(), value.into());
        self
    }

    /// Set the result of a no-argument getter
    #[must_use]
    pub fn with_getter(self, method: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.getters.borrow_mut().insert(method.into(), value.into());
        self
    }

    /// Override the reported interfaces
    #[must_use]
    pub fn with_interface(self, interface: impl Into<String>) -> Self {
        self.0
            .interfaces
            .borrow_mut()
            .get_or_insert_with(Vec::new)
            .push(interface.into());
        self
    }

    /// Replace the text content
    pub fn set_text(&self, text: impl Into<String>) {
        *self.0.text.borrow_mut() = Some(text.into());
    }

    /// Replace the name
    pub fn set_name(&self, name: impl Into<String>) {
        *self.0.name.borrow_mut() = name.into();
    }

    /// Append a child
    pub fn add_child(&self, child: Self) {
        self.0.children.borrow_mut().push(child);
    }

    /// Value `do_action` reports; defaults to `true`
    pub fn set_action_result(&self, result: bool) {
        self.0.action_result.set(Some(result));
    }

    /// Make every backend call on this widget fail
    pub fn set_unreachable(&self, unreachable: bool) {
        self.0.unreachable.set(unreachable);
    }

    /// Names of the actions invoked so far, in order
    #[must_use]
    pub fn invocations(&self) -> Vec<String> {
        self.0.invocations.borrow().clone()
    }

    fn reachable(&self) -> E2eResult<()> {
        if self.0.unreachable.get() {
            return Err(E2eError::backend(format!(
                "{}('{}') is not reachable",
                self.0.role.borrow(),
                self.0.name.borrow()
            )));
        }
        Ok(())
    }
}

impl PartialEq for MockNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MockNode {}

impl fmt::Debug for MockNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockNode")
            .field("role", &self.0.role.borrow())
            .field("name", &self.0.name.borrow())
            .field("children", &self.0.children.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Accessible for MockNode {
    fn role_name(&self) -> E2eResult<String> {
        self.reachable()?;
        Ok(self.0.role.borrow().clone())
    }

    fn name(&self) -> E2eResult<String> {
        self.reachable()?;
        Ok(self.0.name.borrow().clone())
    }

    fn text(&self) -> E2eResult<Option<String>> {
        self.reachable()?;
        Ok(self.0.text.borrow().clone())
    }

    fn child_count(&self) -> E2eResult<usize> {
        self.reachable()?;
        Ok(self.0.children.borrow().len())
    }

    fn child_at(&self, index: usize) -> E2eResult<Self> {
        self.reachable()?;
        self.0
            .children
            .borrow()
            .get(index)
            .cloned()
            .ok_or_else(|| E2eError::backend(format!("no child at index {index}")))
    }

    fn action_count(&self) -> E2eResult<usize> {
        self.reachable()?;
        Ok(self.0.actions.borrow().len())
    }

    fn action_name(&self, index: usize) -> E2eResult<String> {
        self.reachable()?;
        self.0
            .actions
            .borrow()
            .get(index)
            .map(|a| a.name.clone())
            .ok_or_else(|| E2eError::backend(format!("no action at index {index}")))
    }

    fn do_action(&self, index: usize) -> E2eResult<bool> {
        self.reachable()?;
        // handler is cloned out so it may borrow this node again
        let (name, handler) = {
            let actions = self.0.actions.borrow();
            let action = actions
                .get(index)
                .ok_or_else(|| E2eError::backend(format!("no action at index {index}")))?;
            (action.name.clone(), action.handler.clone())
        };
        self.0.invocations.borrow_mut().push(name);
        if let Some(handler) = handler {
            handler();
        }
        Ok(self.0.action_result.get().unwrap_or(true))
    }

    fn property(&self, name: &str) -> E2eResult<Option<String>> {
        self.reachable()?;
        Ok(self.0.properties.borrow().get(name).cloned())
    }

    fn getter(&self, method: &str) -> E2eResult<Option<String>> {
        self.reachable()?;
        Ok(self.0.getters.borrow().get(method).cloned())
    }

    fn interfaces(&self) -> E2eResult<Vec<String>> {
        self.reachable()?;
        if let Some(explicit) = self.0.interfaces.borrow().as_ref() {
            return Ok(explicit.clone());
        }
        let mut found = vec!["Accessible".to_string()];
        if !self.0.actions.borrow().is_empty() {
            found.push("Action".to_string());
        }
        if self.0.text.borrow().is_some() {
            found.push("Text".to_string());
        }
        Ok(found)
    }
}

// =============================================================================
// MOCK DESKTOP
// =============================================================================

struct Pending {
    app: MockNode,
    after_polls: usize,
}

/// Mock desktop listing mock applications
#[derive(Default)]
pub struct MockDesktop {
    apps: RefCell<Vec<MockNode>>,
    pending: RefCell<Vec<Pending>>,
    polls: Cell<usize>,
    unreachable: Cell<bool>,
}

impl MockDesktop {
    /// Create an empty desktop
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application immediately
    #[must_use]
    pub fn with_application(self, app: MockNode) -> Self {
        self.register(app);
        self
    }

    /// Register an application once it has been polled `polls` times
    #[must_use]
    pub fn with_delayed_application(self, app: MockNode, polls: usize) -> Self {
        self.pending.borrow_mut().push(Pending {
            app,
            after_polls: polls,
        });
        self
    }

    /// Register an application immediately
    pub fn register(&self, app: MockNode) {
        self.apps.borrow_mut().push(app);
    }

    /// Make `applications` fail
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.set(unreachable);
    }

    /// Number of times the application list was requested
    #[must_use]
    pub fn polls(&self) -> usize {
        self.polls.get()
    }
}

impl fmt::Debug for MockDesktop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDesktop")
            .field("apps", &self.apps.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .field("polls", &self.polls.get())
            .finish()
    }
}

impl Desktop for MockDesktop {
    type Node = MockNode;

    fn applications(&self) -> E2eResult<Vec<MockNode>> {
        if self.unreachable.get() {
            return Err(E2eError::backend("desktop is not reachable"));
        }
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        let (ready, waiting): (Vec<Pending>, Vec<Pending>) = self
            .pending
            .take()
            .into_iter()
            .partition(|p| p.after_polls < polls);
        *self.pending.borrow_mut() = waiting;
        self.apps
            .borrow_mut()
            .extend(ready.into_iter().map(|p| p.app));
        Ok(self.apps.borrow().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod node_tests {
        use super::*;

        #[test]
        fn test_clones_share_state() {
            let label = MockNode::new("label", "");
            let alias = label.clone();
            alias.set_text("changed");
            assert_eq!(label.text().unwrap().as_deref(), Some("changed"));
            assert_eq!(label, alias);
            assert_ne!(label, MockNode::new("label", ""));
        }

        #[test]
        fn test_default_interfaces() {
            let plain = MockNode::new("frame", "w");
            assert_eq!(plain.interfaces().unwrap(), vec!["Accessible"]);
            let button = MockNode::new("push button", "b").with_action("click");
            assert_eq!(button.interfaces().unwrap(), vec!["Accessible", "Action"]);
            let label = MockNode::new("label", "").with_text("t");
            assert_eq!(label.interfaces().unwrap(), vec!["Accessible", "Text"]);
        }

        #[test]
        fn test_explicit_interfaces() {
            let node = MockNode::new("canvas", "").with_interface("Component");
            assert_eq!(node.interfaces().unwrap(), vec!["Component"]);
        }

        #[test]
        fn test_handler_may_touch_node() {
            let button = MockNode::new("push button", "0");
            let me = button.clone();
            let button = button.with_action_handler("click", move || {
                let next = me.name().unwrap().parse::<u32>().unwrap() + 1;
                me.set_name(next.to_string());
            });
            button.do_action(0).unwrap();
            button.do_action(0).unwrap();
            assert_eq!(button.name().unwrap(), "2");
        }

        #[test]
        fn test_out_of_range_is_backend_error() {
            let node = MockNode::new("panel", "");
            assert!(node.child_at(0).is_err());
            assert!(node.action_name(0).is_err());
            assert!(node.do_action(0).is_err());
        }
    }

    mod desktop_tests {
        use super::*;

        #[test]
        fn test_immediate_registration() {
            let desktop = MockDesktop::new().with_application(MockNode::new("application", "a"));
            assert_eq!(desktop.applications().unwrap().len(), 1);
            assert_eq!(desktop.polls(), 1);
        }

        #[test]
        fn test_delayed_registration() {
            let desktop =
                MockDesktop::new().with_delayed_application(MockNode::new("application", "a"), 2);
            assert!(desktop.applications().unwrap().is_empty());
            assert!(desktop.applications().unwrap().is_empty());
            assert_eq!(desktop.applications().unwrap().len(), 1);
            assert_eq!(desktop.polls(), 3);
        }

        #[test]
        fn test_unreachable() {
            let desktop = MockDesktop::new();
            desktop.set_unreachable(true);
            assert!(desktop.applications().is_err());
        }
    }
}
