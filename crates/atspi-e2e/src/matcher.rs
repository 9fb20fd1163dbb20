//! Named match conditions combined with AND.
//!
//! A [`Conditions`] set maps a condition name to a [`Condition`]. Three names
//! are reserved:
//!
//! - `nth`: signed position among siblings (`-1` is the last child)
//! - `when`: arbitrary predicate over the node and its [`TreePath`]
//! - `path`: reserved without defined semantics, rejected with
//!   [`E2eError::UnsupportedCondition`]
//!
//! Every other name is an attribute condition evaluated through the
//! [`AttributeAccessor`](crate::attribute::AttributeAccessor).
//! An empty set matches every node.
//!
//! ```
//! use atspi_e2e::conditions;
//! use atspi_e2e::mock::MockNode;
//! use atspi_e2e::matcher::Matcher;
//! use atspi_e2e::walk::TreePath;
//! use regex::Regex;
//!
//! let label = MockNode::new("label", "").with_text("Has pulsado 4 veces");
//! let conds = conditions![role = "label", text = Regex::new("Has pulsado.*").unwrap()];
//! let matcher = Matcher::new(&conds).unwrap();
//! assert!(matcher.matches(&label, &TreePath::root()).unwrap());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::attribute::{Attribute, AttributeAccessor};
use crate::node::Accessible;
use crate::result::{E2eError, E2eResult};
use crate::walk::{NthOf, TreePath};

/// Condition name for positional matching
pub const NTH: &str = "nth";
/// Condition name for predicate matching
pub const WHEN: &str = "when";
/// Reserved condition name without defined semantics
pub const PATH: &str = "path";

/// Expected value of an attribute condition
pub enum AttrPattern {
    /// Attribute must be found and equal
    Literal(String),
    /// Attribute must be found and equal to these bytes
    Bytes(Vec<u8>),
    /// Attribute must be found and matched from its first to its last byte
    Regex(Regex),
    /// Applied to the whole lookup outcome, failures included
    Predicate(Box<dyn Fn(&Attribute) -> bool>),
}

impl AttrPattern {
    /// Full-match regex pattern
    pub fn regex(pattern: &str) -> E2eResult<Self> {
        Self::regex_with(pattern, |builder| builder)
    }

    /// Full-match regex pattern compiled with extra builder options.
    ///
    /// The pattern is wrapped in `\A(?:…)\z`, so the whole value must match
    /// even with `multi_line` enabled.
    ///
    /// ```
    /// use atspi_e2e::AttrPattern;
    ///
    /// let p = AttrPattern::regex_with("contar", |b| b.case_insensitive(true)).unwrap();
    /// assert!(p.test(&Ok("Contar".to_string())));
    /// ```
    pub fn regex_with(
        pattern: &str,
        configure: impl FnOnce(&mut RegexBuilder) -> &mut RegexBuilder,
    ) -> E2eResult<Self> {
        let mut builder = RegexBuilder::new(&format!(r"\A(?:{pattern})\z"));
        configure(&mut builder);
        builder
            .build()
            .map(Self::Regex)
            .map_err(|e| E2eError::invalid_condition(pattern, e.to_string()))
    }

    /// Predicate over the lookup outcome
    pub fn predicate(f: impl Fn(&Attribute) -> bool + 'static) -> Self {
        Self::Predicate(Box::new(f))
    }

    /// Test a lookup outcome against this pattern
    #[must_use]
    pub fn test(&self, attribute: &Attribute) -> bool {
        match (self, attribute) {
            (Self::Predicate(f), _) => f(attribute),
            (_, Err(_)) => false,
            (Self::Literal(expected), Ok(value)) => expected == value,
            (Self::Bytes(expected), Ok(value)) => expected.as_slice() == value.as_bytes(),
            (Self::Regex(re), Ok(value)) => full_match(re, value),
        }
    }
}

/// Whether the leftmost match of `re` covers all of `value`.
///
/// A caller-built regex keeps its own options, so it is never recompiled.
/// On alternations the preferred branch decides: `ab|a` fully matches "ab"
/// but `a|ab` does not. [`AttrPattern::regex`] has no such caveat.
fn full_match(re: &Regex, value: &str) -> bool {
    re.find(value)
        .is_some_and(|m| m.start() == 0 && m.end() == value.len())
}

impl fmt::Debug for AttrPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::Predicate(_) => f.write_str("<predicate>"),
        }
    }
}

impl From<&str> for AttrPattern {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for AttrPattern {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<&String> for AttrPattern {
    fn from(value: &String) -> Self {
        Self::Literal(value.clone())
    }
}

impl From<Regex> for AttrPattern {
    fn from(value: Regex) -> Self {
        Self::Regex(value)
    }
}

impl From<&[u8]> for AttrPattern {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for AttrPattern {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Predicate over a node and its position
pub type NodePredicate<N> = Box<dyn Fn(&N, &TreePath) -> bool>;

/// A single named condition
pub enum Condition<N> {
    /// Signed position among siblings
    Nth(i64),
    /// Arbitrary predicate
    When(NodePredicate<N>),
    /// Path expression (unsupported)
    Path(String),
    /// Attribute pattern
    Attr(AttrPattern),
}

impl<N> Condition<N> {
    /// Predicate condition
    pub fn when(f: impl Fn(&N, &TreePath) -> bool + 'static) -> Self {
        Self::When(Box::new(f))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Nth(_) => "position",
            Self::When(_) => "predicate",
            Self::Path(_) => "path",
            Self::Attr(_) => "attribute pattern",
        }
    }
}

impl<N> fmt::Debug for Condition<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nth(n) => write!(f, "{n}"),
            Self::When(_) => f.write_str("<predicate>"),
            Self::Path(p) => write!(f, "{p:?}"),
            Self::Attr(p) => write!(f, "{p:?}"),
        }
    }
}

impl<N> From<AttrPattern> for Condition<N> {
    fn from(value: AttrPattern) -> Self {
        Self::Attr(value)
    }
}

impl<N> From<&str> for Condition<N> {
    fn from(value: &str) -> Self {
        Self::Attr(value.into())
    }
}

impl<N> From<String> for Condition<N> {
    fn from(value: String) -> Self {
        Self::Attr(value.into())
    }
}

impl<N> From<&String> for Condition<N> {
    fn from(value: &String) -> Self {
        Self::Attr(value.into())
    }
}

impl<N> From<Regex> for Condition<N> {
    fn from(value: Regex) -> Self {
        Self::Attr(value.into())
    }
}

impl<N> From<&[u8]> for Condition<N> {
    fn from(value: &[u8]) -> Self {
        Self::Attr(value.into())
    }
}

impl<N> From<Vec<u8>> for Condition<N> {
    fn from(value: Vec<u8>) -> Self {
        Self::Attr(value.into())
    }
}

impl<N> From<i64> for Condition<N> {
    fn from(value: i64) -> Self {
        Self::Nth(value)
    }
}

impl<N> From<i32> for Condition<N> {
    fn from(value: i32) -> Self {
        Self::Nth(i64::from(value))
    }
}

/// Set of named conditions, evaluated in name order
pub struct Conditions<N> {
    entries: BTreeMap<String, Condition<N>>,
}

impl<N> Conditions<N> {
    /// Empty set, matching every node
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace the condition `name`
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, condition: impl Into<Condition<N>>) -> Self {
        self.entries.insert(name.into(), condition.into());
        self
    }

    /// Attribute condition
    #[must_use]
    pub fn attr(self, name: impl Into<String>, pattern: impl Into<AttrPattern>) -> Self {
        self.with(name, Condition::Attr(pattern.into()))
    }

    /// `role` condition
    #[must_use]
    pub fn role(self, pattern: impl Into<AttrPattern>) -> Self {
        self.attr("role", pattern)
    }

    /// `name` condition
    #[must_use]
    pub fn name(self, pattern: impl Into<AttrPattern>) -> Self {
        self.attr("name", pattern)
    }

    /// `text` condition
    #[must_use]
    pub fn text(self, pattern: impl Into<AttrPattern>) -> Self {
        self.attr("text", pattern)
    }

    /// `nth` condition
    #[must_use]
    pub fn nth(self, position: i64) -> Self {
        self.with(NTH, Condition::Nth(position))
    }

    /// `when` condition
    #[must_use]
    pub fn when(self, f: impl Fn(&N, &TreePath) -> bool + 'static) -> Self {
        self.with(WHEN, Condition::when(f))
    }

    /// `path` condition; rejected when a matcher is built from the set
    #[must_use]
    pub fn path(self, expr: impl Into<String>) -> Self {
        self.with(PATH, Condition::Path(expr.into()))
    }

    /// Condition registered under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Condition<N>> {
        self.entries.get(name)
    }

    /// Whether the set has no conditions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of conditions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Conditions in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition<N>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<N> Default for Conditions<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Display for Conditions<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no conditions");
        }
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v:?}")).collect();
        f.write_str(&parts.join(", "))
    }
}

impl<N> fmt::Debug for Conditions<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Build a [`Conditions`] set from `name = value` pairs.
///
/// Values convert through `Into<Condition<N>>`: strings and byte strings are
/// literals, a `Regex` is a full-match pattern, integers are positions.
#[macro_export]
macro_rules! conditions {
    () => {
        $crate::matcher::Conditions::new()
    };
    ($($name:ident = $value:expr),+ $(,)?) => {
        $crate::matcher::Conditions::new()
            $(.with(stringify!($name), $value))+
    };
}

/// Whether a signed position selects the sibling at `at`
#[must_use]
pub fn nth_matches(position: i64, at: NthOf) -> bool {
    let Ok(count) = i64::try_from(at.count) else {
        return false;
    };
    let Ok(index) = i64::try_from(at.index) else {
        return false;
    };
    let wanted = if position >= 0 { position } else { count + position };
    wanted == index
}

/// Validated conditions ready to be evaluated
pub struct Matcher<'c, N: Accessible> {
    conditions: &'c Conditions<N>,
    accessor: AttributeAccessor<N>,
}

impl<'c, N: Accessible> Matcher<'c, N> {
    /// Validate `conditions` and build a matcher with the standard accessor
    pub fn new(conditions: &'c Conditions<N>) -> E2eResult<Self> {
        for (name, condition) in conditions.iter() {
            match (name, condition) {
                (NTH, Condition::Nth(_)) | (WHEN, Condition::When(_)) => {}
                (PATH, _) | (_, Condition::Path(_)) => {
                    return Err(E2eError::UnsupportedCondition {
                        name: name.to_string(),
                    });
                }
                (NTH | WHEN, other) => {
                    return Err(E2eError::invalid_condition(
                        name,
                        format!("expected a {}, got a {}", expected_kind(name), other.kind()),
                    ));
                }
                (_, Condition::Attr(_)) => {}
                (_, other) => {
                    return Err(E2eError::invalid_condition(
                        name,
                        format!("expected an attribute pattern, got a {}", other.kind()),
                    ));
                }
            }
        }
        Ok(Self {
            conditions,
            accessor: AttributeAccessor::standard(),
        })
    }

    /// Use a custom attribute accessor
    #[must_use]
    pub fn with_accessor(mut self, accessor: AttributeAccessor<N>) -> Self {
        self.accessor = accessor;
        self
    }

    /// Conditions being evaluated
    #[must_use]
    pub fn conditions(&self) -> &Conditions<N> {
        self.conditions
    }

    /// Whether `node` at `path` satisfies every condition
    pub fn matches(&self, node: &N, path: &TreePath) -> E2eResult<bool> {
        for (name, condition) in self.conditions.iter() {
            let ok = match condition {
                Condition::Nth(position) => nth_matches(*position, path.last()),
                Condition::When(f) => f(node, path),
                Condition::Attr(pattern) => pattern.test(&self.accessor.get(node, name)?),
                Condition::Path(_) => {
                    return Err(E2eError::UnsupportedCondition {
                        name: name.to_string(),
                    })
                }
            };
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn expected_kind(name: &str) -> &'static str {
    if name == NTH {
        "position"
    } else {
        "predicate"
    }
}

impl<N: Accessible> fmt::Debug for Matcher<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("conditions", self.conditions)
            .finish_non_exhaustive()
    }
}
