//! Scoped interactions: act on and check the subtrees under chosen widgets.
//!
//! [`perform_on`] picks, inside each root, the first widget matching a
//! condition set; [`perform_on_all`] picks every matching widget. The
//! resulting [`Interaction`] then works the way a user would, within those
//! scopes only:
//!
//! ```
//! use atspi_e2e::conditions;
//! use atspi_e2e::mock::MockNode;
//! use atspi_e2e::perform_on;
//!
//! let label = MockNode::new("label", "").with_text("Has pulsado 0 veces");
//! let shown = label.clone();
//! let app = MockNode::new("application", "contador").with_child(
//!     MockNode::new("frame", "Contador").with_child(label).with_child(
//!         MockNode::new("push button", "Contar")
//!             .with_action_handler("click", move || shown.set_text("Has pulsado 1 vez")),
//!     ),
//! );
//!
//! let ui = perform_on(&app, &conditions![role = "frame"])?;
//! ui.act("click", &conditions![role = "push button", name = "Contar"])?;
//! assert!(ui.shows(&conditions![role = "label", text = "Has pulsado 1 vez"])?);
//! # Ok::<(), atspi_e2e::E2eError>(())
//! ```

use tracing::debug;

use crate::action::perform;
use crate::expect::{check, Quantifier};
use crate::matcher::{Conditions, Matcher};
use crate::node::{describe, Accessible};
use crate::query::{find_obj, first_match, objects_in, role_hint, IntoRoots};
use crate::result::{E2eError, E2eResult};

/// Widgets that scope further actions and checks
#[derive(Debug, Clone)]
pub struct Interaction<N: Accessible> {
    scopes: Vec<N>,
}

/// Scope on the first widget matching `conditions` inside each root.
///
/// Fails with [`E2eError::NotFound`] when any root has no match.
pub fn perform_on<N: Accessible>(
    roots: impl IntoRoots<N>,
    conditions: &Conditions<N>,
) -> E2eResult<Interaction<N>> {
    let roots = roots.into_roots();
    if roots.is_empty() {
        return Err(not_found(&roots, conditions)?);
    }
    let scopes = roots
        .iter()
        .map(|root| find_obj(root, conditions))
        .collect::<E2eResult<Vec<_>>>()?;
    debug!(conditions = %conditions, scopes = scopes.len(), "perform_on");
    Ok(Interaction { scopes })
}

/// Scope on every widget matching `conditions` under the roots.
///
/// Fails with [`E2eError::NotFound`] when nothing matches at all.
pub fn perform_on_all<N: Accessible>(
    roots: impl IntoRoots<N>,
    conditions: &Conditions<N>,
) -> E2eResult<Interaction<N>> {
    let roots = roots.into_roots();
    let scopes = objects_in(&roots, conditions)?;
    if scopes.is_empty() {
        return Err(not_found(&roots, conditions)?);
    }
    debug!(conditions = %conditions, scopes = scopes.len(), "perform_on_all");
    Ok(Interaction { scopes })
}

fn not_found<N: Accessible>(roots: &[N], conditions: &Conditions<N>) -> E2eResult<E2eError> {
    let root = if roots.is_empty() {
        "no roots".to_string()
    } else {
        roots.iter().map(describe).collect::<E2eResult<Vec<_>>>()?.join(", ")
    };
    Ok(E2eError::NotFound {
        root,
        conditions: conditions.to_string(),
        hint: role_hint(conditions),
    })
}

impl<N: Accessible> Interaction<N> {
    /// Scope widgets, in search order
    #[must_use]
    pub fn scopes(&self) -> &[N] {
        &self.scopes
    }

    /// Perform `action` on the first widget matching `conditions` in every
    /// scope.
    ///
    /// Every target is looked up before the first action runs, so a scope
    /// without a match leaves the others untouched.
    pub fn act(&self, action: &str, conditions: &Conditions<N>) -> E2eResult<()> {
        let targets = self
            .scopes
            .iter()
            .map(|scope| find_obj(scope, conditions))
            .collect::<E2eResult<Vec<_>>>()?;
        perform(action).on_all(&targets)
    }

    /// Whether every scope shows a widget matching `conditions`
    pub fn shows(&self, conditions: &Conditions<N>) -> E2eResult<bool> {
        let matcher = shows_matcher(conditions)?;
        check(self.scopes.as_slice(), Quantifier::All, |scope| {
            Ok(first_match(scope, &matcher)?.is_some())
        })
    }

    /// For each scope, whether it shows a widget matching `conditions`
    pub fn shows_each(&self, conditions: &Conditions<N>) -> E2eResult<Vec<bool>> {
        let matcher = shows_matcher(conditions)?;
        self.scopes
            .iter()
            .map(|scope| Ok(first_match(scope, &matcher)?.is_some()))
            .collect()
    }
}

fn shows_matcher<N: Accessible>(conditions: &Conditions<N>) -> E2eResult<Matcher<'_, N>> {
    if conditions.is_empty() {
        return Err(E2eError::MissingConditions {
            operation: "shows".to_string(),
        });
    }
    Matcher::new(conditions)
}
