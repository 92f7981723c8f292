//! Selectors Level 3 - Element matching and specificity.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! This module implements the subset needed for static style resolution:
//! - Type, universal, class, id and attribute selectors (all six operators)
//! - Combinators: descendant, child, adjacent sibling, general sibling
//! - Structural pseudo-classes (`:first-child`, `:nth-of-type()`, `:root`, ...)
//! - Negation (`:not()`) and `:lang()`
//! - A caller-supplied set of pseudo-classes/elements that are accepted but
//!   ignored while matching (dynamic states such as `:hover`, and `::before`)
//! - Specificity calculation
//!
//! Unsupported or malformed selectors are reported as a [`SelectorError`].

use core::fmt;
use core::hash::Hash;

mod matcher;
mod parser;
mod specificity;

// Re-export public API
pub use matcher::{matches_complex, matches_compound};
pub use parser::parse_complex_selector;
pub use specificity::{Specificity, specificity_of_complex, specificity_of_compound};

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
///
/// Spec references:
/// - Section 3: Selectors overview and element matching
pub trait ElementAdapter {
    type Handle: Copy + Eq + Hash;

    /// Parent element if any. The document node itself is not an element.
    /// Spec: Section 11 - Combinators (for tree relationships)
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling element (skip non-elements if your DOM has mixed nodes).
    /// Spec: Section 11 - Sibling combinators
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Next sibling element.
    /// Spec: Section 6.6.5 - Structural pseudo-classes
    fn next_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name of the element.
    /// Spec: Section 5 - Type selectors
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns Some(id) if the element has an id attribute, else None.
    /// Spec: Section 7 - ID selectors
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the element has the given class token.
    /// Spec: Section 6 - Class selectors
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Returns the attribute value if present.
    /// Spec: Section 8 - Attribute selectors
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// True if the element has no element children and no non-empty text.
    /// Spec: Section 6.6.5.9 - `:empty`
    fn is_empty(&self, element: Self::Handle) -> bool;
}

/// Attribute selector operators.
/// Spec: Section 6.3 - Attribute selectors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals,
    /// `[attr~=value]`
    Includes,
    /// `[attr|=value]`
    DashMatch,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr*=value]`
    Substring,
}

/// Pseudo-classes understood by the matcher.
/// Spec: Section 6.6
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    /// `:nth-child(an+b)` and its variants. `of_type` counts only siblings
    /// with the same tag; `from_end` counts from the last sibling.
    Nth {
        step: i32,
        offset: i32,
        of_type: bool,
        from_end: bool,
    },
    /// `:not(a, b)`: matches when none of the compounds match.
    Not(Vec<CompoundSelector>),
    /// `:lang(code)`, lowercased.
    Lang(String),
    Root,
    Empty,
    /// Accepted but always matching; the name is kept for routing.
    Ignored(String),
}

/// Simple selectors (subset).
/// Spec: Section 5, 6, 7, 8
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// Spec: Section 5 - Type selectors
    Type(String),
    /// Spec: Section 6 - Class selectors
    Class(String),
    /// Spec: Section 7 - ID selectors
    IdSelector(String),
    /// Spec: Section 8 - Attribute selectors
    Attribute {
        name: String,
        operator: AttrOperator,
        value: String,
    },
    /// Spec: Section 6.6 - Pseudo-classes
    PseudoClass(PseudoClass),
    /// Spec: Section 7 - Pseudo-elements. Matches the originating element.
    PseudoElement(String),
    /// Spec: Section 5 - Universal selector
    Universal,
}

/// A compound selector is a sequence of simple selectors (no combinators).
/// Spec: Section 5 - Simple selector sequences
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
/// Spec: Section 11 - Combinators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// A complex selector is one or more compounds separated by combinators.
/// Spec: Section 3, 11
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// Compound at `position`, counting `first` as 0.
    #[inline]
    pub fn compound_at(&self, position: usize) -> Option<&CompoundSelector> {
        match position.checked_sub(1) {
            None => Some(&self.first),
            Some(index) => self.rest.get(index).map(|pair| &pair.1),
        }
    }

    /// Combinator joining the compound at `position` to its left neighbour.
    #[inline]
    pub fn combinator_before(&self, position: usize) -> Option<Combinator> {
        let index = position.checked_sub(1)?;
        self.rest.get(index).map(|pair| pair.0)
    }

    /// Iterate over every simple selector, left to right.
    pub fn simples(&self) -> impl Iterator<Item = &SimpleSelector> {
        self.first
            .simples
            .iter()
            .chain(self.rest.iter().flat_map(|pair| pair.1.simples.iter()))
    }

    /// First ignored pseudo-class or pseudo-element name, in source order.
    pub fn ignored_pseudo(&self) -> Option<&str> {
        self.simples().find_map(|simple| match simple {
            SimpleSelector::PseudoClass(PseudoClass::Ignored(name))
            | SimpleSelector::PseudoElement(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Failure to parse a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorError {
    /// Nothing to parse.
    Empty,
    /// Malformed selector text.
    Syntax(String),
    /// A pseudo-class or pseudo-element this matcher does not implement.
    UnsupportedPseudo(String),
    /// Valid CSS the matcher does not implement (namespaces, escapes).
    UnsupportedSyntax(String),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("empty selector"),
            Self::Syntax(detail) => write!(formatter, "invalid selector: {detail}"),
            Self::UnsupportedPseudo(name) => write!(formatter, "unsupported pseudo: {name}"),
            Self::UnsupportedSyntax(detail) => write!(formatter, "unsupported selector syntax: {detail}"),
        }
    }
}

impl core::error::Error for SelectorError {}
