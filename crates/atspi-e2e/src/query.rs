//! Query engine: collect every descendant that satisfies a condition set.

use tracing::debug;

use crate::attribute::AttributeAccessor;
use crate::matcher::{AttrPattern, Condition, Conditions, Matcher};
use crate::node::{describe, Accessible};
use crate::result::{E2eError, E2eResult};
use crate::roles::is_role_name;
use crate::walk::walk;

/// One or several search roots
pub trait IntoRoots<N> {
    /// Roots in search order
    fn into_roots(self) -> Vec<N>;
}

impl<N: Accessible> IntoRoots<N> for &N {
    fn into_roots(self) -> Vec<N> {
        vec![self.clone()]
    }
}

impl<N: Accessible> IntoRoots<N> for &[N] {
    fn into_roots(self) -> Vec<N> {
        self.to_vec()
    }
}

impl<N: Accessible> IntoRoots<N> for &Vec<N> {
    fn into_roots(self) -> Vec<N> {
        self.clone()
    }
}

impl<N: Accessible> IntoRoots<N> for Vec<N> {
    fn into_roots(self) -> Vec<N> {
        self
    }
}

impl<N: Accessible> IntoRoots<N> for Option<&N> {
    fn into_roots(self) -> Vec<N> {
        self.into_iter().cloned().collect()
    }
}

/// Every node under `roots` accepted by `matcher`, in pre-order per root
pub fn select<N: Accessible>(roots: impl IntoRoots<N>, matcher: &Matcher<'_, N>) -> E2eResult<Vec<N>> {
    let mut found = Vec::new();
    for root in roots.into_roots() {
        for item in walk(&root) {
            let (path, node) = item?;
            if matcher.matches(&node, &path)? {
                found.push(node);
            }
        }
    }
    Ok(found)
}

/// Every node under `roots` satisfying all `conditions`.
///
/// Roots are searched in order and the results concatenated; a node reachable
/// from two roots appears twice.
pub fn objects_in<N: Accessible>(
    roots: impl IntoRoots<N>,
    conditions: &Conditions<N>,
) -> E2eResult<Vec<N>> {
    objects_in_with(roots, conditions, AttributeAccessor::standard())
}

/// [`objects_in`] with attributes looked up through `accessor`
pub fn objects_in_with<N: Accessible>(
    roots: impl IntoRoots<N>,
    conditions: &Conditions<N>,
    accessor: AttributeAccessor<N>,
) -> E2eResult<Vec<N>> {
    let matcher = Matcher::new(conditions)?.with_accessor(accessor);
    let found = select(roots, &matcher)?;
    debug!(conditions = %conditions, matches = found.len(), "objects_in");
    Ok(found)
}

/// First node under `root` accepted by `matcher`, in pre-order
pub fn first_match<N: Accessible>(root: &N, matcher: &Matcher<'_, N>) -> E2eResult<Option<N>> {
    for item in walk(root) {
        let (path, node) = item?;
        if matcher.matches(&node, &path)? {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

/// First node under `root`, in pre-order, satisfying all `conditions`.
///
/// An empty condition set selects `root` itself.
pub fn find_obj<N: Accessible>(root: &N, conditions: &Conditions<N>) -> E2eResult<N> {
    let matcher = Matcher::new(conditions)?;
    let found = first_match(root, &matcher)?;
    debug!(conditions = %conditions, found = found.is_some(), "find_obj");
    match found {
        Some(node) => Ok(node),
        None => Err(E2eError::NotFound {
            root: describe(root)?,
            conditions: conditions.to_string(),
            hint: role_hint(conditions),
        }),
    }
}

pub(crate) fn role_hint<N>(conditions: &Conditions<N>) -> String {
    match conditions.get("role") {
        Some(Condition::Attr(AttrPattern::Literal(role))) if !is_role_name(role) => {
            format!("\n'{role}' is not a role name")
        }
        _ => String::new(),
    }
}
