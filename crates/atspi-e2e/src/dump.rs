//! Desktop and widget tree dumps for debugging.
//!
//! ## Example Output
//!
//! ```text
//! └ application(contador) [Accessible, Application]
//!   └ frame(Contador) [Accessible, Component]
//!     ├ label() [Accessible, Text]
//!     └ push button(Contar) [Accessible, Action(click)]
//! ```

use serde::{Deserialize, Serialize};

use crate::node::{action_names, Accessible};
use crate::result::{E2eError, E2eResult};
use crate::session::Desktop;
use crate::walk::{walk, TreePath};

pub use crate::session::find_application;

/// Snapshot of a widget and its subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpNode {
    /// Role name
    pub role: String,
    /// Accessible name
    pub name: String,
    /// Implemented interfaces
    pub interfaces: Vec<String>,
    /// Action names, empty when the widget has no `Action` interface
    pub actions: Vec<String>,
    /// Children, in order
    pub children: Vec<DumpNode>,
}

impl DumpNode {
    /// Snapshot of `node` alone, without children
    pub fn of<N: Accessible>(node: &N) -> E2eResult<Self> {
        let interfaces = node.interfaces()?;
        let actions = if interfaces.iter().any(|i| i == "Action") {
            action_names(node)?
        } else {
            Vec::new()
        };
        Ok(Self {
            role: node.role_name()?,
            name: node.name()?,
            interfaces,
            actions,
            children: Vec::new(),
        })
    }

    /// `role(name) [interfaces]`, with `Action` expanded to its action names
    #[must_use]
    pub fn label(&self) -> String {
        let interfaces: Vec<String> = self
            .interfaces
            .iter()
            .map(|i| {
                if i == "Action" {
                    format!("Action({})", self.actions.join(","))
                } else {
                    i.clone()
                }
            })
            .collect();
        format!("{}({}) [{}]", self.role, self.name, interfaces.join(", "))
    }

    /// Number of widgets in this subtree
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// Names of every application on the desktop
pub fn list_applications<D: Desktop>(desktop: &D) -> E2eResult<Vec<String>> {
    desktop.applications()?.iter().map(Accessible::name).collect()
}

/// Snapshot of the whole tree under `root`
pub fn dump_tree<N: Accessible>(root: &N) -> E2eResult<DumpNode> {
    // stack[d] is the open ancestor at depth d
    let mut stack: Vec<DumpNode> = Vec::new();
    for item in walk(root) {
        let (path, node) = item?;
        while stack.len() > path.depth() {
            close(&mut stack);
        }
        stack.push(DumpNode::of(&node)?);
    }
    while stack.len() > 1 {
        close(&mut stack);
    }
    stack
        .pop()
        .ok_or_else(|| E2eError::backend("tree walk produced no nodes"))
}

fn close(stack: &mut Vec<DumpNode>) {
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(done);
        } else {
            stack.push(done);
        }
    }
}

/// Tree-drawing prefix for a node at `path`
#[must_use]
pub fn branches(path: &TreePath) -> String {
    let segments = path.segments();
    let Some((last, ancestors)) = segments.split_last() else {
        return String::new();
    };
    let mut out: String = ancestors
        .iter()
        .map(|s| if s.is_last() { "  " } else { "│ " })
        .collect();
    out.push_str(if last.is_last() { "└ " } else { "├ " });
    out
}

/// One line per widget under `root`, drawn as a tree
pub fn render_tree<N: Accessible>(root: &N) -> E2eResult<String> {
    let mut out = String::new();
    for item in walk(root) {
        let (path, node) = item?;
        out.push_str(&branches(&path));
        out.push_str(&DumpNode::of(&node)?.label());
        out.push('\n');
    }
    Ok(out)
}
