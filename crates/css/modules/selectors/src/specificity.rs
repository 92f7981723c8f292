//! CSS selector specificity calculation.
//! Spec: <https://www.w3.org/TR/selectors-3/#specificity>

use crate::{ComplexSelector, CompoundSelector, PseudoClass, SimpleSelector};

/// Specificity triple (a, b, c).
/// Spec: Section 13 - Calculating a selector's specificity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u16, pub u16, pub u16);

impl Specificity {
    /// Number of ID selectors.
    #[inline]
    pub const fn ids(self) -> u16 {
        self.0
    }

    /// Number of class, attribute and pseudo-class selectors.
    #[inline]
    pub const fn classes(self) -> u16 {
        self.1
    }

    /// Number of type selectors and pseudo-elements.
    #[inline]
    pub const fn elements(self) -> u16 {
        self.2
    }

    /// Component-wise saturating sum.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(
            self.0.saturating_add(other.0),
            self.1.saturating_add(other.1),
            self.2.saturating_add(other.2),
        )
    }
}

/// Compute the specificity of a compound selector.
/// A `:not()` contributes its most specific argument instead of a class.
/// Spec: Section 13 - Specificity (a, b, c)
pub fn specificity_of_compound(compound: &CompoundSelector) -> Specificity {
    compound
        .simples
        .iter()
        .fold(Specificity::default(), |total, simple| {
            let own = match simple {
                SimpleSelector::IdSelector(_) => Specificity(1, 0, 0),
                SimpleSelector::PseudoClass(PseudoClass::Not(compounds)) => compounds
                    .iter()
                    .map(specificity_of_compound)
                    .max()
                    .unwrap_or_default(),
                SimpleSelector::Class(_)
                | SimpleSelector::Attribute { .. }
                | SimpleSelector::PseudoClass(_) => Specificity(0, 1, 0),
                SimpleSelector::Type(_) | SimpleSelector::PseudoElement(_) => Specificity(0, 0, 1),
                SimpleSelector::Universal => Specificity::default(),
            };
            total.saturating_add(own)
        })
}

/// Compute the specificity of a complex selector (sum of its compounds).
/// Spec: Section 13 - Specificity accumulation
pub fn specificity_of_complex(sel: &ComplexSelector) -> Specificity {
    sel.rest
        .iter()
        .fold(specificity_of_compound(&sel.first), |total, pair| {
            total.saturating_add(specificity_of_compound(&pair.1))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_complex_selector;
    use core::error::Error;
    use std::collections::HashSet;

    /// Specificity counts ids, class-likes and element-likes across compounds.
    ///
    /// # Errors
    /// Returns an error if a selector fails to parse.
    #[test]
    fn counts_each_category() -> Result<(), Box<dyn Error>> {
        let ignored: HashSet<String> = ["hover", "before"].iter().map(|name| (*name).to_owned()).collect();
        let cases = [
            ("*", Specificity(0, 0, 0)),
            ("li", Specificity(0, 0, 1)),
            ("ul li", Specificity(0, 0, 2)),
            ("ul ol+li", Specificity(0, 0, 3)),
            ("h1 + *[rel=up]", Specificity(0, 1, 1)),
            ("ul ol li.red", Specificity(0, 1, 3)),
            ("li.red.level", Specificity(0, 2, 1)),
            ("#x34y", Specificity(1, 0, 0)),
            ("a:hover", Specificity(0, 1, 1)),
            ("p::before", Specificity(0, 0, 2)),
            ("div#main > p:first-child", Specificity(1, 1, 2)),
            ("li:nth-child(2n+1)", Specificity(0, 1, 1)),
            ("p:not(#a)", Specificity(1, 0, 1)),
            ("p:not(.a, div.b)", Specificity(0, 1, 2)),
            ("*:not(*)", Specificity(0, 0, 0)),
            ("html:lang(en)", Specificity(0, 1, 1)),
        ];
        for (text, expected) in cases {
            let selector = parse_complex_selector(text, &ignored)?;
            assert_eq!(specificity_of_complex(&selector), expected, "{text}");
        }
        Ok(())
    }

    /// Ordering is lexicographic: one id beats any number of classes.
    #[test]
    fn orders_lexicographically() {
        assert!(Specificity(1, 0, 0) > Specificity(0, 99, 99));
        assert!(Specificity(0, 1, 0) > Specificity(0, 0, 42));
        assert_eq!(Specificity(2, 3, 4).ids(), 2);
        assert_eq!(Specificity(2, 3, 4).classes(), 3);
        assert_eq!(Specificity(2, 3, 4).elements(), 4);
    }
}
