//! Uniform attribute lookup over heterogeneous widgets.
//!
//! A lookup either finds a value or fails with an [`AttributeError`]; the
//! failure is a value, not a panic, so matchers can treat it as "no match"
//! and predicates can inspect it. Only transport failures of the backend
//! travel through the outer [`E2eResult`].
//!
//! Resolution walks an ordered chain of [`AttributeResolver`]s:
//!
//! 1. reserved names (`role`, `name`, `text`)
//! 2. a direct property of the widget
//! 3. a no-argument getter named `get_<name>`
//!
//! ```
//! use atspi_e2e::mock::MockNode;
//! use atspi_e2e::{get_attribute, is_error};
//!
//! let label = MockNode::new("label", "greeting").with_text("hola");
//! assert_eq!(get_attribute(&label, "text").unwrap().unwrap(), "hola");
//! assert!(is_error(&get_attribute(&label, "colour").unwrap()));
//! ```

use std::fmt;

use thiserror::Error;

use crate::node::{describe, Accessible};
use crate::result::E2eResult;

/// A failed attribute lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{node} has no attribute {attribute}")]
pub struct AttributeError {
    /// Display form of the widget
    pub node: String,
    /// Name that was looked up
    pub attribute: String,
}

impl AttributeError {
    /// Create a new lookup failure
    #[must_use]
    pub fn new(node: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attribute: attribute.into(),
        }
    }
}

/// Outcome of an attribute lookup: the value or the reason it is missing
pub type Attribute = Result<String, AttributeError>;

/// Answer of a single resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The resolver produced a value
    Found(String),
    /// The resolver does not know this attribute; try the next one
    NotFound,
}

impl From<Option<String>> for Resolution {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

/// One step of the lookup chain
pub trait AttributeResolver<N: Accessible> {
    /// Try to resolve `name` on `node`
    fn resolve(&self, node: &N, name: &str) -> E2eResult<Resolution>;
}

/// `role`, `name` and `text` synonyms
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservedNames;

impl<N: Accessible> AttributeResolver<N> for ReservedNames {
    fn resolve(&self, node: &N, name: &str) -> E2eResult<Resolution> {
        Ok(match name {
            "role" => Resolution::Found(node.role_name()?),
            "name" => Resolution::Found(node.name()?),
            "text" => node.text()?.into(),
            _ => Resolution::NotFound,
        })
    }
}

/// Properties stored directly on the widget
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectProperties;

impl<N: Accessible> AttributeResolver<N> for DirectProperties {
    fn resolve(&self, node: &N, name: &str) -> E2eResult<Resolution> {
        Ok(node.property(name)?.into())
    }
}

/// No-argument getters following the `get_<name>` convention
#[derive(Debug, Clone, Copy, Default)]
pub struct Getters;

impl<N: Accessible> AttributeResolver<N> for Getters {
    fn resolve(&self, node: &N, name: &str) -> E2eResult<Resolution> {
        Ok(node.getter(&format!("get_{name}"))?.into())
    }
}

/// Ordered resolver chain; the first resolver that finds a value wins
pub struct AttributeAccessor<N: Accessible> {
    resolvers: Vec<Box<dyn AttributeResolver<N>>>,
}

impl<N: Accessible> AttributeAccessor<N> {
    /// The standard chain: reserved names, direct properties, getters
    #[must_use]
    pub fn standard() -> Self {
        Self {
            resolvers: vec![
                Box::new(ReservedNames),
                Box::new(DirectProperties),
                Box::new(Getters),
            ],
        }
    }
}

impl<N: Accessible> AttributeAccessor<N> {
    /// An accessor that resolves nothing
    #[must_use]
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Append a resolver to the end of the chain
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl AttributeResolver<N> + 'static) -> Self {
        self.push(resolver);
        self
    }

    /// Append a resolver to the end of the chain
    pub fn push(&mut self, resolver: impl AttributeResolver<N> + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    /// Look up `name` on `node`
    pub fn get(&self, node: &N, name: &str) -> E2eResult<Attribute> {
        for resolver in &self.resolvers {
            if let Resolution::Found(value) = resolver.resolve(node, name)? {
                return Ok(Ok(value));
            }
        }
        Ok(Err(AttributeError::new(describe(node)?, name)))
    }
}

impl<N: Accessible> Default for AttributeAccessor<N> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<N: Accessible> fmt::Debug for AttributeAccessor<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeAccessor")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

/// Look up `name` on `node` with the standard chain
pub fn get_attribute<N: Accessible>(node: &N, name: &str) -> E2eResult<Attribute> {
    AttributeAccessor::standard().get(node, name)
}

/// Whether a lookup failed
#[must_use]
pub fn is_error(attribute: &Attribute) -> bool {
    attribute.is_err()
}

/// Promote a failed lookup to a fatal error
pub fn fail_on_error(attribute: Attribute) -> E2eResult<String> {
    Ok(attribute?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNode;
    use crate::E2eError;

    mod reserved_tests {
        use super::*;

        #[test]
        fn test_role_and_name() {
            let button = MockNode::new("push button", "Contar");
            assert_eq!(get_attribute(&button, "role").unwrap().unwrap(), "push button");
            assert_eq!(get_attribute(&button, "name").unwrap().unwrap(), "Contar");
        }

        #[test]
        fn test_empty_name_is_found() {
            let label = MockNode::new("label", "");
            assert_eq!(get_attribute(&label, "name").unwrap(), Ok(String::new()));
        }

        #[test]
        fn test_text_missing_without_text_interface() {
            let frame = MockNode::new("frame", "Contador");
            let attr = get_attribute(&frame, "text").unwrap();
            assert_eq!(attr, Err(AttributeError::new("frame('Contador')", "text")));
        }

        #[test]
        fn test_text_found() {
            let label = MockNode::new("label", "").with_text("Has pulsado 0 veces");
            assert_eq!(
                get_attribute(&label, "text").unwrap().unwrap(),
                "Has pulsado 0 veces"
            );
        }
    }

    mod chain_tests {
        use super::*;

        #[test]
        fn test_direct_property_before_getter() {
            let node = MockNode::new("label", "x")
                .with_property("description", "direct")
                .with_getter("get_description", "getter");
            assert_eq!(get_attribute(&node, "description").unwrap().unwrap(), "direct");
        }

        #[test]
        fn test_getter_fallback() {
            let node = MockNode::new("label", "x").with_getter("get_locale", "es_ES");
            assert_eq!(get_attribute(&node, "locale").unwrap().unwrap(), "es_ES");
        }

        #[test]
        fn test_reserved_name_shadows_property() {
            let node = MockNode::new("label", "real").with_property("name", "shadow");
            assert_eq!(get_attribute(&node, "name").unwrap().unwrap(), "real");
        }

        #[test]
        fn test_missing_attribute_names_node() {
            let node = MockNode::new("label", "x");
            let err = get_attribute(&node, "colour").unwrap().unwrap_err();
            assert_eq!(err.to_string(), "label('x') has no attribute colour");
        }

        #[test]
        fn test_custom_resolver() {
            struct Upper;
            impl AttributeResolver<MockNode> for Upper {
                fn resolve(&self, node: &MockNode, name: &str) -> E2eResult<Resolution> {
                    Ok(if name == "shout" {
                        Resolution::Found(node.name()?.to_uppercase())
                    } else {
                        Resolution::NotFound
                    })
                }
            }
            let accessor = AttributeAccessor::standard().with_resolver(Upper);
            let node = MockNode::new("label", "hey");
            assert_eq!(accessor.get(&node, "shout").unwrap().unwrap(), "HEY");
        }

        #[test]
        fn test_empty_accessor_finds_nothing() {
            let accessor = AttributeAccessor::<MockNode>::empty();
            let node = MockNode::new("label", "hey");
            assert!(accessor.get(&node, "role").unwrap().is_err());
        }

        #[test]
        fn test_backend_error_propagates() {
            let node = MockNode::new("label", "x");
            node.set_unreachable(true);
            assert!(matches!(
                get_attribute(&node, "role"),
                Err(E2eError::Backend { .. })
            ));
        }
    }

    mod promotion_tests {
        use super::*;

        #[test]
        fn test_is_error() {
            assert!(!is_error(&Ok("x".to_string())));
            assert!(is_error(&Err(AttributeError::new("n", "a"))));
        }

        #[test]
        fn test_fail_on_error() {
            assert_eq!(fail_on_error(Ok("v".to_string())).unwrap(), "v");
            let err = fail_on_error(Err(AttributeError::new("label('')", "text"))).unwrap_err();
            assert!(matches!(err, E2eError::Attribute(_)));
        }
    }
}
