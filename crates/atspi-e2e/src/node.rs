//! Accessible tree adapter.
//!
//! The accessibility service is an external collaborator. Everything the
//! engine needs from it is captured by the [`Accessible`] trait, so the same
//! query, action and expectation code runs against the real AT-SPI2 backend
//! (feature `atspi`) and against [`crate::mock::MockNode`] trees in tests.
//!
//! Backend calls are fallible: a transient failure of the accessibility
//! service is returned as [`crate::E2eError::Backend`] and propagates
//! immediately. Nothing is retried.

use std::fmt::Debug;

use crate::result::E2eResult;

/// A handle to one accessible object (widget) of the application under test.
///
/// Handles are cheap to clone and are never cached or mutated by this crate.
pub trait Accessible: Clone + Debug + 'static {
    /// Role name, e.g. `"push button"` or `"label"`
    fn role_name(&self) -> E2eResult<String>;

    /// Accessible name, empty when the widget has none
    fn name(&self) -> E2eResult<String>;

    /// Full text content, `None` when the widget exposes no text
    fn text(&self) -> E2eResult<Option<String>>;

    /// Number of children
    fn child_count(&self) -> E2eResult<usize>;

    /// Child at `index` (0-based)
    fn child_at(&self, index: usize) -> E2eResult<Self>;

    /// Number of actions the widget provides
    fn action_count(&self) -> E2eResult<usize>;

    /// Name of the action at `index`
    fn action_name(&self, index: usize) -> E2eResult<String>;

    /// Invoke the action at `index`; returns the backend's success flag
    fn do_action(&self, index: usize) -> E2eResult<bool>;

    /// Backend-specific property stored directly on the widget
    fn property(&self, _name: &str) -> E2eResult<Option<String>> {
        Ok(None)
    }

    /// Result of the no-argument getter `method` (e.g. `get_description`)
    fn getter(&self, _method: &str) -> E2eResult<Option<String>> {
        Ok(None)
    }

    /// Interfaces implemented by the widget (`Accessible`, `Action`, `Text`...)
    fn interfaces(&self) -> E2eResult<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Ordered list of the children of `node`.
pub fn children<N: Accessible>(node: &N) -> E2eResult<Vec<N>> {
    (0..node.child_count()?)
        .map(|i| node.child_at(i))
        .collect()
}

/// Names of every action of `node`, in backend order.
pub fn action_names<N: Accessible>(node: &N) -> E2eResult<Vec<String>> {
    (0..node.action_count()?)
        .map(|i| node.action_name(i))
        .collect()
}

/// Zero-based index of the action named `name`, if any.
pub fn action_index<N: Accessible>(node: &N, name: &str) -> E2eResult<Option<usize>> {
    for i in 0..node.action_count()? {
        if node.action_name(i)? == name {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

/// Human-readable display form `role('name')` used in every diagnostic.
pub fn describe<N: Accessible>(node: &N) -> E2eResult<String> {
    Ok(format!("{}('{}')", node.role_name()?, node.name()?))
}
