//! Cascade priority key for a declaration.
//! Spec: <https://www.w3.org/TR/css-cascade-4/#cascade-sort>

use css_selectors::Specificity as SelectorSpecificity;

/// Position of a flattened style rule across every sheet reachable from one
/// document. Strictly increasing in encounter order.
pub type RuleIndex = u32;

/// Priority tuple used to order declarations in the cascade.
///
/// Compared lexicographically in field order; higher wins. A `style`
/// attribute outranks every selector-derived specificity, and the rule index
/// breaks ties between equally specific selectors.
/// Spec: Section 6.1 - Cascade sorting order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    /// Declared in a `style` attribute.
    pub is_style: bool,
    /// ID selectors.
    pub num_id: u16,
    /// Class, attribute and pseudo-class selectors.
    pub num_class: u16,
    /// Type selectors and pseudo-elements.
    pub num_elem: u16,
    /// Source order of the rule.
    pub rule_index: RuleIndex,
}

impl Specificity {
    /// Priority of a `style` attribute declaration. There is no selector and no
    /// rule, so every count is zero.
    pub const INLINE: Self = Self {
        is_style: true,
        num_id: 0,
        num_class: 0,
        num_elem: 0,
        rule_index: 0,
    };
}

/// Combine a selector's (id, class, element) counts with the rule index and origin.
/// Spec: Section 6.1 - Cascade sorting order
#[inline]
pub const fn specificity(
    rule_index: RuleIndex,
    selector: SelectorSpecificity,
    is_style: bool,
) -> Specificity {
    Specificity {
        is_style,
        num_id: selector.ids(),
        num_class: selector.classes(),
        num_elem: selector.elements(),
        rule_index,
    }
}
