//! Quantified expectations over widget sets.
//!
//! An expectation pairs a set of candidate widgets with a [`Quantifier`] and
//! checks what they show. The raising forms (`to_show*`) fail with
//! [`E2eError::AssertionFailed`], whose message lists every candidate and its
//! actual value so a failing test explains itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, AttributeAccessor};
use crate::matcher::AttrPattern;
use crate::node::{describe, Accessible};
use crate::result::{E2eError, E2eResult};

/// How many candidates must satisfy an expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantifier {
    /// Every candidate (vacuously true on an empty set)
    All,
    /// At least one candidate
    Any,
    /// The first candidate
    First,
    /// Exactly one candidate
    One,
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Any => "any",
            Self::First => "first",
            Self::One => "one",
        };
        f.write_str(s)
    }
}

/// Apply `quantifier` to `predicate` over `nodes`, short-circuiting
pub fn check<N, F>(nodes: &[N], quantifier: Quantifier, mut predicate: F) -> E2eResult<bool>
where
    F: FnMut(&N) -> E2eResult<bool>,
{
    match quantifier {
        Quantifier::All => {
            for node in nodes {
                if !predicate(node)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Quantifier::Any => {
            for node in nodes {
                if predicate(node)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Quantifier::First => match nodes.first() {
            Some(node) => predicate(node),
            None => Ok(false),
        },
        Quantifier::One => {
            let mut hits = 0usize;
            for node in nodes {
                if predicate(node)? {
                    hits += 1;
                    if hits > 1 {
                        return Ok(false);
                    }
                }
            }
            Ok(hits == 1)
        }
    }
}

/// Candidates plus the quantifier they are judged by
#[derive(Debug)]
pub struct Expectation<'a, N: Accessible> {
    nodes: &'a [N],
    quantifier: Quantifier,
    accessor: AttributeAccessor<N>,
}

/// Expect exactly one candidate to satisfy the check
pub fn expect<N: Accessible>(nodes: &[N]) -> Expectation<'_, N> {
    Expectation::new(nodes, Quantifier::One)
}

/// Expect every candidate to satisfy the check
pub fn expect_all<N: Accessible>(nodes: &[N]) -> Expectation<'_, N> {
    Expectation::new(nodes, Quantifier::All)
}

/// Expect at least one candidate to satisfy the check
pub fn expect_any<N: Accessible>(nodes: &[N]) -> Expectation<'_, N> {
    Expectation::new(nodes, Quantifier::Any)
}

/// Expect the first candidate to satisfy the check
pub fn expect_first<N: Accessible>(nodes: &[N]) -> Expectation<'_, N> {
    Expectation::new(nodes, Quantifier::First)
}

/// Expect exactly one candidate to satisfy the check
pub fn expect_one<N: Accessible>(nodes: &[N]) -> Expectation<'_, N> {
    Expectation::new(nodes, Quantifier::One)
}

impl<'a, N: Accessible> Expectation<'a, N> {
    /// Create an expectation over `nodes`
    #[must_use]
    pub fn new(nodes: &'a [N], quantifier: Quantifier) -> Self {
        Self {
            nodes,
            quantifier,
            accessor: AttributeAccessor::standard(),
        }
    }

    /// Use a custom attribute accessor
    #[must_use]
    pub fn with_accessor(mut self, accessor: AttributeAccessor<N>) -> Self {
        self.accessor = accessor;
        self
    }

    /// Quantifier in use
    #[must_use]
    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    /// Whether the candidates show `text`
    pub fn shows(&self, text: &str) -> E2eResult<bool> {
        self.shows_attr("text", text)
    }

    /// Whether attribute `name` of the candidates matches `pattern`
    pub fn shows_attr(&self, name: &str, pattern: impl Into<AttrPattern>) -> E2eResult<bool> {
        let pattern = pattern.into();
        self.holds(name, &pattern)
    }

    /// Assert that the candidates show `text`
    pub fn to_show(&self, text: &str) -> E2eResult<()> {
        self.to_show_attr("text", text)
    }

    /// Assert that attribute `name` of the candidates matches `pattern`
    pub fn to_show_attr(&self, name: &str, pattern: impl Into<AttrPattern>) -> E2eResult<()> {
        let pattern = pattern.into();
        if self.holds(name, &pattern)? {
            return Ok(());
        }
        Err(E2eError::assertion(self.explain(name, &pattern)?))
    }

    fn holds(&self, name: &str, pattern: &AttrPattern) -> E2eResult<bool> {
        check(self.nodes, self.quantifier, |node| {
            Ok(pattern.test(&self.accessor.get(node, name)?))
        })
    }

    fn explain(&self, name: &str, pattern: &AttrPattern) -> E2eResult<String> {
        let mut msg = format!(
            "expected {} of {} widgets to show {name}={pattern:?}",
            self.quantifier,
            self.nodes.len()
        );
        if self.nodes.is_empty() {
            msg.push_str(", but there are no widgets");
            return Ok(msg);
        }
        msg.push_str(", found:");
        for node in self.nodes {
            let actual: Attribute = self.accessor.get(node, name)?;
            match actual {
                Ok(value) => msg.push_str(&format!("\n  {} {name}={value:?}", describe(node)?)),
                Err(e) => msg.push_str(&format!("\n  {e}")),
            }
        }
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNode;
    use proptest::prelude::*;
    use regex::Regex;

    fn label(text: &str) -> MockNode {
        MockNode::new("label", "").with_text(text)
    }

    mod check_tests {
        use super::*;

        fn run(values: &[bool], q: Quantifier) -> bool {
            check(values, q, |v| Ok(*v)).unwrap()
        }

        #[test]
        fn test_all() {
            assert!(run(&[], Quantifier::All));
            assert!(run(&[true, true], Quantifier::All));
            assert!(!run(&[true, false], Quantifier::All));
        }

        #[test]
        fn test_any() {
            assert!(!run(&[], Quantifier::Any));
            assert!(run(&[false, true], Quantifier::Any));
        }

        #[test]
        fn test_first() {
            assert!(!run(&[], Quantifier::First));
            assert!(run(&[true, false], Quantifier::First));
            assert!(!run(&[false, true], Quantifier::First));
        }

        #[test]
        fn test_one() {
            assert!(!run(&[], Quantifier::One));
            assert!(run(&[false, true, false], Quantifier::One));
            assert!(!run(&[true, true], Quantifier::One));
        }

        #[test]
        fn test_short_circuit() {
            let mut calls = 0;
            check(&[false, true, true], Quantifier::All, |v| {
                calls += 1;
                Ok(*v)
            })
            .unwrap();
            assert_eq!(calls, 1);
        }

        #[test]
        fn test_error_propagates() {
            let r = check(&[1], Quantifier::Any, |_| Err(E2eError::backend("gone")));
            assert!(r.is_err());
        }
    }

    mod expectation_tests {
        use super::*;

        #[test]
        fn test_to_show_passes() {
            let nodes = vec![label("Has pulsado 0 veces")];
            expect(&nodes).to_show("Has pulsado 0 veces").unwrap();
            expect_any(&nodes).to_show("Has pulsado 0 veces").unwrap();
            expect_first(&nodes).to_show("Has pulsado 0 veces").unwrap();
        }

        #[test]
        fn test_failure_lists_candidates() {
            let nodes = vec![label("Has pulsado 1 vez"), MockNode::new("frame", "w")];
            let err = expect_any(&nodes).to_show("Has pulsado 2 veces").unwrap_err();
            let msg = err.to_string();
            assert!(msg.starts_with("Assertion failed: expected any of 2 widgets"));
            assert!(msg.contains("label('') text=\"Has pulsado 1 vez\""));
            assert!(msg.contains("frame('w') has no attribute text"));
        }

        #[test]
        fn test_failure_on_empty_set() {
            let nodes: Vec<MockNode> = Vec::new();
            let err = expect_any(&nodes).to_show("x").unwrap_err();
            assert!(err.to_string().contains("there are no widgets"));
            expect_all(&nodes).to_show("x").unwrap();
        }

        #[test]
        fn test_expect_one_rejects_duplicates() {
            let nodes = vec![label("x"), label("x")];
            assert!(!expect_one(&nodes).shows("x").unwrap());
            assert!(!expect(&nodes).shows("x").unwrap());
            let nodes = vec![label("x"), label("y")];
            assert!(expect_one(&nodes).shows("x").unwrap());
        }

        #[test]
        fn test_shows_attr_with_regex() {
            let nodes = vec![label("Has pulsado 4 veces"), label("Has pulsado 3 veces")];
            let re = Regex::new(r"Has pulsado \d veces").unwrap();
            assert!(expect_all(&nodes).shows_attr("text", re).unwrap());
        }

        #[test]
        fn test_to_show_attr_name() {
            let nodes = vec![MockNode::new("push button", "Contar")];
            expect(&nodes).to_show_attr("name", "Contar").unwrap();
            assert!(expect(&nodes).to_show_attr("name", "Otro").is_err());
        }

        #[test]
        fn test_custom_accessor() {
            use crate::attribute::{AttributeResolver, Resolution};

            struct Length;
            impl AttributeResolver<MockNode> for Length {
                fn resolve(&self, node: &MockNode, name: &str) -> E2eResult<Resolution> {
                    Ok(match (name, node.text()?) {
                        ("length", Some(text)) => Resolution::Found(text.chars().count().to_string()),
                        _ => Resolution::NotFound,
                    })
                }
            }
            let nodes = vec![label("Has pulsado 1 vez")];
            let accessor = AttributeAccessor::standard().with_resolver(Length);
            expect(&nodes)
                .with_accessor(accessor)
                .to_show_attr("length", "17")
                .unwrap();
            assert!(!expect(&nodes).shows_attr("length", "17").unwrap());
        }
    }

    #[test]
    fn test_quantifier_serde() {
        let json = serde_json::to_string(&Quantifier::First).unwrap();
        assert_eq!(json, "\"first\"");
        let q: Quantifier = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(q, Quantifier::All);
    }

    proptest! {
        #[test]
        fn prop_one_means_exactly_one(values in prop::collection::vec(any::<bool>(), 0..12)) {
            let hits = values.iter().filter(|v| **v).count();
            let got = check(&values, Quantifier::One, |v| Ok(*v)).unwrap();
            prop_assert_eq!(got, hits == 1);
        }
    }
}
