//! CSS Cascading and Inheritance Level 4 - Cascade, inheritance, and computed values.
//! Spec: <https://www.w3.org/TR/css-cascade-4/>

#![forbid(unsafe_code)]

use core::hash::Hash;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;

mod inherit;
mod normalize;
pub mod properties;
mod specificity;
mod values;

pub use inherit::resolve_property;
pub use normalize::{
    DeclarationMap, Expansion, Longhands, expand_declaration, expansion_for,
    normalize_style_declaration,
};
pub use specificity::{RuleIndex, Specificity, specificity};
pub use values::PropertyValue;

/// Element to its resolved declarations.
pub type StyleMap<H> = HashMap<H, DeclarationMap>;

/// (element, pseudo-element or ignored pseudo-class name) to its resolved declarations.
pub type PseudoStyleMap<H> = HashMap<(H, String), DeclarationMap>;

/// One rule's normalized declarations as they apply to one element.
/// The declaration map is shared by every element the rule matched.
#[derive(Clone, Debug)]
pub struct StyleDeclaration {
    pub specificity: Specificity,
    pub declaration: Rc<DeclarationMap>,
    /// Pseudo tag taken from the selector, `None` for the element itself.
    pub pseudo_element: Option<String>,
}

impl StyleDeclaration {
    #[inline]
    pub const fn new(
        specificity: Specificity,
        declaration: Rc<DeclarationMap>,
        pseudo_element: Option<String>,
    ) -> Self {
        Self {
            specificity,
            declaration,
            pseudo_element,
        }
    }
}

/// Sort highest priority first. The sort is stable.
/// Spec: Section 6.4 - Cascade sorting order
#[inline]
pub fn sort_declarations(declarations: &mut [StyleDeclaration]) {
    declarations.sort_by(|left, right| right.specificity.cmp(&left.specificity));
}

/// Collapse declarations already sorted by [`sort_declarations`] into one
/// value per property. For each property the first important value wins;
/// without one, the first value wins.
/// Spec: Section 6.4 - `!important` rules
pub fn resolve_declarations(declarations: &[StyleDeclaration]) -> DeclarationMap {
    let mut resolved = DeclarationMap::new();
    for style in declarations {
        for (name, value) in &*style.declaration {
            match resolved.entry(name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(value.clone());
                }
                Entry::Occupied(mut slot) => {
                    if value.is_important() && !slot.get().is_important() {
                        slot.insert(value.clone());
                    }
                }
            }
        }
    }
    resolved
}

/// Sort then collapse one element's candidate declarations.
#[inline]
pub fn cascade(mut declarations: Vec<StyleDeclaration>) -> DeclarationMap {
    sort_declarations(&mut declarations);
    resolve_declarations(&declarations)
}

/// Gathers candidate declarations per element during one resolution pass
/// and collapses them once every sheet has been seen.
#[derive(Debug)]
pub struct CascadeCollector<H> {
    elements: HashMap<H, Vec<StyleDeclaration>>,
    pseudo_elements: HashMap<(H, String), Vec<StyleDeclaration>>,
}

impl<H> Default for CascadeCollector<H> {
    #[inline]
    fn default() -> Self {
        Self {
            elements: HashMap::new(),
            pseudo_elements: HashMap::new(),
        }
    }
}

impl<H: Copy + Eq + Hash> CascadeCollector<H> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration for `element`, routed by its pseudo tag.
    pub fn push(&mut self, element: H, style: StyleDeclaration) {
        match style.pseudo_element.clone() {
            Some(pseudo) => self
                .pseudo_elements
                .entry((element, pseudo))
                .or_default()
                .push(style),
            None => self.elements.entry(element).or_default().push(style),
        }
    }

    /// Number of elements with at least one base declaration.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Collapse everything into the base and pseudo style maps.
    pub fn finish(self) -> (StyleMap<H>, PseudoStyleMap<H>) {
        let style_map = self
            .elements
            .into_iter()
            .map(|(element, declarations)| (element, cascade(declarations)))
            .collect();
        let pseudo_style_map = self
            .pseudo_elements
            .into_iter()
            .map(|(key, declarations)| (key, cascade(declarations)))
            .collect();
        (style_map, pseudo_style_map)
    }
}
