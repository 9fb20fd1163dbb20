//! atspi-e2e: End-to-End GUI Testing Through the Accessibility Tree
//!
//! Drives a running graphical application from the outside, the way an
//! assistive technology would: widgets are located by their semantic
//! attributes (role, name, text...), manipulated through their accessible
//! actions, and checked against the text they show.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    atspi-e2e Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Session    │    │ Query      │    │ Action /   │            │
//! │   │ (launch +  │───►│ (walk +    │───►│ Expectation│            │
//! │   │  discover) │    │  match)    │    │            │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                 ▲                  │                   │
//! │         ▼                 │                  ▼                   │
//! │   ┌──────────────────────────────────────────────────┐          │
//! │   │        Accessible trait (AT-SPI2 or mock)         │          │
//! │   └──────────────────────────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use atspi_e2e::conditions;
//! use atspi_e2e::mock::MockNode;
//! use atspi_e2e::{expect_first, objects_in, perform};
//!
//! let label = MockNode::new("label", "").with_text("Has pulsado 0 veces");
//! let shown = label.clone();
//! let window = MockNode::new("frame", "Contador")
//!     .with_child(label)
//!     .with_child(
//!         MockNode::new("push button", "Contar")
//!             .with_action_handler("click", move || shown.set_text("Has pulsado 1 vez")),
//!     );
//!
//! let button = objects_in(&window, &conditions![role = "push button", name = "Contar"])?;
//! perform("click").on(&button)?;
//!
//! let labels = objects_in(&window, &conditions![role = "label"])?;
//! expect_first(&labels).to_show("Has pulsado 1 vez")?;
//! # Ok::<(), atspi_e2e::E2eError>(())
//! ```

#![warn(missing_docs)]

pub mod action;
pub mod attribute;
#[cfg(feature = "atspi")]
pub mod atspi;
pub mod config;
pub mod dump;
pub mod expect;
pub mod interaction;
pub mod matcher;
pub mod mock;
pub mod node;
pub mod query;
mod result;
pub mod roles;
pub mod session;
pub mod walk;

pub use action::{perform, Action};
pub use attribute::{
    fail_on_error, get_attribute, is_error, Attribute, AttributeAccessor, AttributeError,
    AttributeResolver, Resolution,
};
#[cfg(feature = "atspi")]
pub use atspi::{AtspiDesktop, AtspiNode};
pub use config::LaunchOptions;
pub use expect::{expect, expect_all, expect_any, expect_first, expect_one, Expectation, Quantifier};
pub use interaction::{perform_on, perform_on_all, Interaction};
pub use matcher::{AttrPattern, Condition, Conditions, Matcher};
pub use node::{describe, Accessible};
pub use query::{find_obj, objects_in, objects_in_with, IntoRoots};
pub use result::{E2eError, E2eResult};
#[cfg(feature = "atspi")]
pub use session::run;
pub use session::{launch, Desktop, Session};
pub use walk::{walk, NthOf, TreePath};
