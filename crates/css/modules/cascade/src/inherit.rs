//! Effective value lookup across the ancestor chain.
//! Spec: <https://www.w3.org/TR/CSS21/cascade.html#inheritance>

use crate::properties::{default_value, is_inherited_property};
use crate::{PropertyValue, StyleMap};
use css_selectors::ElementAdapter;

/// The effective value of `property_name` on `element`.
///
/// Inherited properties take the nearest explicit value on the element or an
/// ancestor; other properties only look at the element itself. Without an
/// explicit value the initial value is used, and unknown properties have none.
/// Explicit values are returned as declared, keywords such as `inherit` included.
/// Spec: Section 6.2 - Inheritance
pub fn resolve_property<'map, A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    property_name: &str,
    style_map: &'map StyleMap<A::Handle>,
) -> Option<&'map PropertyValue> {
    let inheritable = is_inherited_property(property_name);
    let mut current = Some(element);
    while let Some(node) = current {
        let explicit = style_map
            .get(&node)
            .and_then(|declarations| declarations.get(property_name));
        if explicit.is_some() {
            return explicit;
        }
        if !inheritable {
            break;
        }
        current = adapter.parent(node);
    }
    default_value(property_name)
}
