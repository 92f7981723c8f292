//! CSS selector matching engine.
//! Spec: <https://www.w3.org/TR/selectors-3/>

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, ElementAdapter, PseudoClass,
    SimpleSelector,
};

/// Match a complex selector against an element.
/// Spec: Section 3, 11 - Right-to-left matching strategy
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    matches_at(adapter, element, sel, sel.rest.len())
}

/// Match the compound at `position` against `element`, then relate the
/// remaining compounds to its left through their combinators. Descendant and
/// general-sibling combinators backtrack over every candidate.
/// Spec: Section 11 - Combinators
fn matches_at<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
    position: usize,
) -> bool {
    let Some(compound) = sel.compound_at(position) else {
        return false;
    };
    if !matches_compound(adapter, element, compound) {
        return false;
    }
    let Some(left) = position.checked_sub(1) else {
        return true;
    };
    let Some(combinator) = sel.combinator_before(position) else {
        return false;
    };
    match combinator {
        Combinator::Descendant => {
            let mut current_parent = adapter.parent(element);
            while let Some(ancestor_element) = current_parent {
                if matches_at(adapter, ancestor_element, sel, left) {
                    return true;
                }
                current_parent = adapter.parent(ancestor_element);
            }
            false
        }
        Combinator::Child => adapter
            .parent(element)
            .is_some_and(|parent_el| matches_at(adapter, parent_el, sel, left)),
        Combinator::AdjacentSibling => adapter
            .previous_sibling_element(element)
            .is_some_and(|prev_el| matches_at(adapter, prev_el, sel, left)),
        Combinator::GeneralSibling => {
            let mut current_sibling = adapter.previous_sibling_element(element);
            while let Some(sibling_element) = current_sibling {
                if matches_at(adapter, sibling_element, sel, left) {
                    return true;
                }
                current_sibling = adapter.previous_sibling_element(sibling_element);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
/// Spec: Section 5–8
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(adapter, element, simple))
}

/// Match one simple selector.
fn matches_simple<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    simple: &SimpleSelector,
) -> bool {
    match simple {
        SimpleSelector::Universal | SimpleSelector::PseudoElement(_) => true,
        SimpleSelector::Type(type_name) => adapter.tag_name(element).eq_ignore_ascii_case(type_name),
        SimpleSelector::Class(class_name) => adapter.has_class(element, class_name),
        SimpleSelector::IdSelector(id_value) => adapter
            .element_id(element)
            .is_some_and(|value| value == id_value),
        SimpleSelector::Attribute {
            name,
            operator,
            value,
        } => adapter
            .attr(element, name)
            .is_some_and(|attr_value| matches_attr(*operator, attr_value, value)),
        SimpleSelector::PseudoClass(pseudo) => matches_pseudo_class(adapter, element, pseudo),
    }
}

/// Apply an attribute operator.
/// Spec: Section 6.3.1, 6.3.2
fn matches_attr(operator: AttrOperator, actual: &str, expected: &str) -> bool {
    match operator {
        AttrOperator::Exists => true,
        AttrOperator::Equals => actual == expected,
        AttrOperator::Includes => {
            !expected.is_empty()
                && !expected.contains(char::is_whitespace)
                && actual.split_whitespace().any(|word| word == expected)
        }
        AttrOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|tail| tail.starts_with('-'))
        }
        AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOperator::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

/// Structural pseudo-classes; ignored ones always match.
/// Spec: Section 6.6.5
fn matches_pseudo_class<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    pseudo: &PseudoClass,
) -> bool {
    match pseudo {
        PseudoClass::Ignored(_) => true,
        PseudoClass::FirstChild => adapter.previous_sibling_element(element).is_none(),
        PseudoClass::LastChild => adapter.next_sibling_element(element).is_none(),
        PseudoClass::OnlyChild => {
            adapter.previous_sibling_element(element).is_none()
                && adapter.next_sibling_element(element).is_none()
        }
        PseudoClass::FirstOfType => {
            !has_sibling_of_same_type(adapter, element, A::previous_sibling_element)
        }
        PseudoClass::LastOfType => {
            !has_sibling_of_same_type(adapter, element, A::next_sibling_element)
        }
        PseudoClass::OnlyOfType => {
            !has_sibling_of_same_type(adapter, element, A::previous_sibling_element)
                && !has_sibling_of_same_type(adapter, element, A::next_sibling_element)
        }
        PseudoClass::Nth {
            step,
            offset,
            of_type,
            from_end,
        } => nth_matches(
            *step,
            *offset,
            sibling_position(adapter, element, *of_type, *from_end),
        ),
        PseudoClass::Not(compounds) => !compounds
            .iter()
            .any(|compound| matches_compound(adapter, element, compound)),
        PseudoClass::Lang(lang) => {
            element_lang(adapter, element).is_some_and(|actual| lang_matches(actual, lang))
        }
        PseudoClass::Root => adapter.parent(element).is_none(),
        PseudoClass::Empty => adapter.is_empty(element),
    }
}

/// Walk siblings in one direction looking for the same tag name.
fn has_sibling_of_same_type<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    step: fn(&A, A::Handle) -> Option<A::Handle>,
) -> bool {
    let tag = adapter.tag_name(element);
    let mut current_sibling = step(adapter, element);
    while let Some(sibling_element) = current_sibling {
        if adapter.tag_name(sibling_element).eq_ignore_ascii_case(tag) {
            return true;
        }
        current_sibling = step(adapter, sibling_element);
    }
    false
}

/// 1-based position of `element` among its siblings, counting only siblings
/// with the same tag when `of_type` is set.
fn sibling_position<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    of_type: bool,
    from_end: bool,
) -> i64 {
    let step: fn(&A, A::Handle) -> Option<A::Handle> = if from_end {
        A::next_sibling_element
    } else {
        A::previous_sibling_element
    };
    let tag = adapter.tag_name(element);
    let mut position = 1_i64;
    let mut current_sibling = step(adapter, element);
    while let Some(sibling_element) = current_sibling {
        if !of_type || adapter.tag_name(sibling_element).eq_ignore_ascii_case(tag) {
            position = position.saturating_add(1);
        }
        current_sibling = step(adapter, sibling_element);
    }
    position
}

/// True when `position` is `step * n + offset` for some `n >= 0`.
/// Spec: Section 6.6.5.2 - `:nth-child()` pseudo-class
fn nth_matches(step: i32, offset: i32, position: i64) -> bool {
    let distance = position.saturating_sub(i64::from(offset));
    if step == 0 {
        return distance == 0;
    }
    let divisor = i64::from(step);
    distance.checked_rem(divisor) == Some(0)
        && distance
            .checked_div(divisor)
            .is_some_and(|count| count >= 0)
}

/// The `lang` attribute of the element or its nearest ancestor that has one.
fn element_lang<A: ElementAdapter>(adapter: &A, element: A::Handle) -> Option<&str> {
    let mut current = Some(element);
    while let Some(node) = current {
        if let Some(lang) = adapter.attr(node, "lang") {
            return Some(lang);
        }
        current = adapter.parent(node);
    }
    None
}

/// `:lang()` matching: equal, or a prefix followed by `-` (ASCII case-insensitive).
/// Spec: Section 6.6.3 - The language pseudo-class
fn lang_matches(actual: &str, expected: &str) -> bool {
    actual.eq_ignore_ascii_case(expected)
        || (actual
            .get(..expected.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(expected))
            && actual.as_bytes().get(expected.len()) == Some(&b'-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_complex_selector;
    use core::error::Error;
    use core::iter::once;
    use std::collections::HashSet;

    /// A flat test tree: each node stores its parent, tag, id and classes.
    struct TestTree {
        nodes: Vec<TestNode>,
    }

    struct TestNode {
        parent: Option<usize>,
        tag: &'static str,
        id: Option<&'static str>,
        classes: Vec<&'static str>,
    }

    impl TestTree {
        fn siblings(&self, element: usize) -> Vec<usize> {
            let parent = self.nodes.get(element).and_then(|node| node.parent);
            (0..self.nodes.len())
                .filter(|index| self.nodes.get(*index).and_then(|node| node.parent) == parent)
                .collect()
        }
    }

    impl ElementAdapter for TestTree {
        type Handle = usize;

        fn parent(&self, element: usize) -> Option<usize> {
            self.nodes.get(element).and_then(|node| node.parent)
        }

        fn previous_sibling_element(&self, element: usize) -> Option<usize> {
            self.siblings(element)
                .into_iter()
                .take_while(|index| *index != element)
                .last()
        }

        fn next_sibling_element(&self, element: usize) -> Option<usize> {
            self.siblings(element)
                .into_iter()
                .skip_while(|index| *index != element)
                .nth(1)
        }

        fn tag_name(&self, element: usize) -> &str {
            self.nodes.get(element).map_or("", |node| node.tag)
        }

        fn element_id(&self, element: usize) -> Option<&str> {
            self.nodes.get(element).and_then(|node| node.id)
        }

        fn has_class(&self, element: usize, class: &str) -> bool {
            self.nodes
                .get(element)
                .is_some_and(|node| node.classes.contains(&class))
        }

        fn attr(&self, element: usize, name: &str) -> Option<&str> {
            match name {
                "id" => self.element_id(element),
                "lang" => Some("en-US"),
                _ => None,
            }
        }

        fn is_empty(&self, element: usize) -> bool {
            !self
                .nodes
                .iter()
                .any(|node| node.parent == Some(element))
        }
    }

    /// html > body > (div.box#a > p, section > (p.x, p))
    fn tree() -> TestTree {
        let node = |parent, tag, id, classes| TestNode {
            parent,
            tag,
            id,
            classes,
        };
        TestTree {
            nodes: vec![
                node(None, "html", None, vec![]),
                node(Some(0), "body", None, vec![]),
                node(Some(1), "div", Some("a"), vec!["box"]),
                node(Some(2), "p", None, vec![]),
                node(Some(1), "section", None, vec![]),
                node(Some(4), "p", None, vec!["x"]),
                node(Some(4), "p", None, vec![]),
            ],
        }
    }

    fn matching(text: &str) -> Result<Vec<usize>, Box<dyn Error>> {
        let tree = tree();
        let ignored: HashSet<String> = once("hover".to_owned()).collect();
        let selector = parse_complex_selector(text, &ignored)?;
        Ok((0..tree.nodes.len())
            .filter(|index| matches_complex(&tree, *index, &selector))
            .collect())
    }

    /// Combinators follow the tree relationships, backtracking where needed.
    ///
    /// # Errors
    /// Returns an error if a selector fails to parse.
    #[test]
    fn matches_combinators() -> Result<(), Box<dyn Error>> {
        assert_eq!(matching("p")?, vec![3, 5, 6]);
        assert_eq!(matching("body p")?, vec![3, 5, 6]);
        assert_eq!(matching("body > p")?, Vec::<usize>::new());
        assert_eq!(matching("div.box > p")?, vec![3]);
        assert_eq!(matching("div + section p")?, vec![5, 6]);
        assert_eq!(matching("p.x + p")?, vec![6]);
        assert_eq!(matching("p.x ~ p")?, vec![6]);
        assert_eq!(matching("html section > p")?, vec![5, 6]);
        Ok(())
    }

    /// Structural and ignored pseudo-classes.
    ///
    /// # Errors
    /// Returns an error if a selector fails to parse.
    #[test]
    fn matches_pseudo_classes() -> Result<(), Box<dyn Error>> {
        assert_eq!(matching(":root")?, vec![0]);
        assert_eq!(matching("p:first-child")?, vec![3, 5]);
        assert_eq!(matching("p:last-child")?, vec![3, 6]);
        assert_eq!(matching("p:only-child")?, vec![3]);
        assert_eq!(matching("section :last-of-type")?, vec![6]);
        assert_eq!(matching("p:empty")?, vec![3, 5, 6]);
        assert_eq!(matching("div:hover")?, vec![2]);
        Ok(())
    }

    /// Positional, negation and language pseudo-classes.
    ///
    /// # Errors
    /// Returns an error if a selector fails to parse.
    #[test]
    fn matches_functional_pseudo_classes() -> Result<(), Box<dyn Error>> {
        assert_eq!(matching("section > p:nth-child(2)")?, vec![6]);
        assert_eq!(matching("p:nth-child(odd)")?, vec![3, 5]);
        assert_eq!(matching("section > :nth-last-child(2)")?, vec![5]);
        assert_eq!(matching("body > :nth-of-type(-n+1)")?, vec![2, 4]);
        assert_eq!(matching("p:nth-last-of-type(1)")?, vec![3, 6]);
        assert_eq!(matching("p:only-of-type")?, vec![3]);
        assert_eq!(matching("p:not(.x)")?, vec![3, 6]);
        assert_eq!(matching("body > :not(div, #nope)")?, vec![4]);
        assert_eq!(matching("div:lang(en)")?, vec![2]);
        assert_eq!(matching("div:lang(fr)")?, Vec::<usize>::new());
        Ok(())
    }

    /// Attribute operators.
    #[test]
    fn applies_attribute_operators() {
        assert!(matches_attr(AttrOperator::Includes, "a b c", "b"));
        assert!(!matches_attr(AttrOperator::Includes, "a b c", ""));
        assert!(matches_attr(AttrOperator::DashMatch, "en-US", "en"));
        assert!(!matches_attr(AttrOperator::DashMatch, "english", "en"));
        assert!(matches_attr(AttrOperator::Prefix, "chapter1", "chap"));
        assert!(matches_attr(AttrOperator::Suffix, "image.png", ".png"));
        assert!(matches_attr(AttrOperator::Substring, "abcdef", "cde"));
        assert!(!matches_attr(AttrOperator::Substring, "abcdef", ""));
        assert!(lang_matches("en-US", "EN"));
        assert!(!lang_matches("english", "en"));
        assert!(nth_matches(0, 3, 3));
        assert!(!nth_matches(2, 0, 3));
        assert!(nth_matches(-1, 3, 1));
        assert!(!nth_matches(-1, 3, 4));
    }
}
